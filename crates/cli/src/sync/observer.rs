// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Callbacks from the sync manager to whoever renders its state.

use std::fmt;

use tally_core::Record;

use super::stats::SyncSummary;

/// Status indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Online,
    Offline,
    /// A sync pass is running.
    Syncing,
    /// The last pass failed for every record it attempted.
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::Online => "online",
            SyncStatus::Offline => "offline",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Receives sync events.
///
/// Called from sync tasks after the queue lock is released. Implementations
/// should return quickly; every method defaults to doing nothing.
pub trait SyncObserver: Send + Sync {
    /// A record was confirmed by the remote store.
    ///
    /// `old_id` is the local id the record carried until now. Owners of
    /// lists holding the same record should re-key their entry, e.g. with
    /// [`tally_core::record::reconcile`].
    fn record_synced(&self, _old_id: &str, _record: &Record) {}

    /// The status indicator changed.
    fn status_changed(&self, _status: SyncStatus) {}

    /// A non-skipped sync pass completed.
    fn pass_finished(&self, _summary: &SyncSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
