// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync of vote records to a remote store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ SyncManager  │────►│ RemoteStore  │────►│ tally-remote │
//! │              │◄────│   (trait)    │◄────│    relay     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!    │        ▲
//!    ▼        │ online/offline
//! ┌──────────────┐  ┌──────────────┐
//! │ LocalStorage │  │ Connectivity │
//! │ (syncQueue)  │  │   (watch)    │
//! └──────────────┘  └──────────────┘
//! ```
//!
//! # Features
//!
//! - Records queued locally under provisional ids, persisted on every change
//! - Windowed submission with an in-flight marker against double submits
//! - Per-submission timeout, bounded retries, dead-letter for hopeless records
//! - Sync on reconnect, on add, and on a fixed timer
//! - Injectable remote store and observer for testing

mod admin;
mod connectivity;
mod manager;
mod observer;
mod remote;
mod stats;
mod websocket;

pub use admin::{find_duplicates, purge_matching, remove_duplicates, CleanupReport, DuplicateGroup};
pub use connectivity::Connectivity;
pub use manager::{SyncConfig, SyncManager, SyncManagerBuilder, QUEUE_KEY, STATS_KEY};
pub use observer::{NoopObserver, SyncObserver, SyncStatus};
pub use remote::{RemoteStore, StoreError, StoreFuture, StoreResult};
pub use stats::{AllRecords, SkipReason, SyncHistory, SyncStats, SyncSummary};
pub use websocket::WebSocketStore;

#[cfg(test)]
mod test_helpers;


#[cfg(test)]
mod integration_tests;
