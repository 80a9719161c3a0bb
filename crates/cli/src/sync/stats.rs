// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Counters and reports produced by the sync manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::Record;

/// Snapshot of the local queue and sync history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStats {
    /// Unsynced records eligible for the next pass (includes in-flight).
    pub pending: usize,
    /// Records currently being submitted.
    pub in_flight: usize,
    /// Confirmed records still held in the queue.
    pub synced: usize,
    /// Dead-lettered records.
    pub failed: usize,
    pub total: usize,
    pub is_online: bool,
    pub auto_sync_running: bool,
    pub total_synced: u64,
    pub total_failed: u64,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
}

/// Lifetime counters persisted next to the queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncHistory {
    pub total_synced: u64,
    pub total_failed: u64,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
}

impl SyncHistory {
    /// Fold a finished pass into the counters.
    pub fn record_pass(&mut self, summary: &SyncSummary, finished_at: DateTime<Utc>) {
        self.total_synced += summary.synced as u64;
        self.total_failed += summary.failed as u64;
        self.last_sync_time = Some(finished_at);
        self.last_duration_ms = Some(summary.duration_ms);
    }
}

/// Why a pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Offline,
    /// No eligible records, or all of them already in flight.
    NothingPending,
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    /// Records selected for submission.
    pub attempted: usize,
    pub synced: usize,
    /// Failed submissions, including timeouts.
    pub failed: usize,
    /// Failures that exhausted the retry budget.
    pub dead_lettered: usize,
    /// Confirmed records removed from the queue at the end of the pass.
    pub pruned: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl SyncSummary {
    pub fn skipped(reason: SkipReason) -> Self {
        SyncSummary {
            skipped: Some(reason),
            ..Default::default()
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Combined view of local and remote records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllRecords {
    /// Unsynced records from the local queue.
    pub local: Vec<Record>,
    /// Records fetched from the remote store. Empty when offline or when
    /// the fetch failed.
    pub remote: Vec<Record>,
    pub total: usize,
}
