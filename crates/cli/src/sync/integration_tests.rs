// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the sync module.
//!
//! These tests run the manager over on-disk storage and verify:
//! - Queued records survive a restart and sync afterwards
//! - Dead-lettered records and history survive a restart
//! - A crash between submission and confirmation leaves the record pending

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use serde_json::json;
use tally_core::FileStorage;
use tempfile::tempdir;

use super::connectivity::Connectivity;
use super::manager::{SyncConfig, SyncManager};
use super::test_helpers::{payload, MockStore};

fn config() -> SyncConfig {
    SyncConfig {
        sync_on_add: false,
        auto_sync: false,
        max_retries: 1,
        ..SyncConfig::default()
    }
}

fn open(dir: &std::path::Path, online: bool) -> SyncManager<MockStore, FileStorage> {
    SyncManager::builder(MockStore::new(), FileStorage::open(dir).unwrap())
        .config(config())
        .connectivity(Connectivity::new(online))
        .build()
}

/// Records added offline in one session sync in the next:
/// 1. Add records while offline
/// 2. Restart
/// 3. Come online and sync
#[tokio::test]
async fn test_queue_survives_restart() {
    let dir = tempdir().unwrap();

    let offline = open(dir.path(), false);
    let a = offline.add_local_record(payload(json!({"name": "Ana"}))).unwrap();
    offline.add_local_record(payload(json!({"name": "Luis"}))).unwrap();
    drop(offline);

    let online = open(dir.path(), true);
    assert_eq!(online.stats().pending, 2);
    assert_eq!(online.records()[0], a);

    let summary = online.sync_pending_records().await.unwrap();
    assert_eq!(summary.synced, 2);
    drop(online);

    let reopened = open(dir.path(), false);
    let stats = reopened.stats();
    assert_eq!(stats.synced, 2);
    assert_eq!(stats.total_synced, 2);
}

#[tokio::test]
async fn test_dead_letters_survive_restart() {
    let dir = tempdir().unwrap();

    let manager = open(dir.path(), true);
    manager.add_local_record(payload(json!({"name": "Ana"}))).unwrap();
    manager.remote().fail_next(1);
    manager.sync_pending_records().await.unwrap();
    drop(manager);

    let reopened = open(dir.path(), true);
    let stats = reopened.stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.total_failed, 1);

    let summary = reopened.retry_failed_records().await.unwrap();
    assert_eq!(summary.synced, 1);
}

#[tokio::test]
async fn test_interrupted_submission_stays_pending() {
    let dir = tempdir().unwrap();

    let manager = open(dir.path(), true);
    manager.add_local_record(payload(json!({"name": "Ana"}))).unwrap();
    manager.remote().hold();

    // Abandon the pass while the submission is outstanding
    let pass = manager.spawn_sync().unwrap();
    tokio::task::yield_now().await;
    pass.abort();
    let _ = pass.await;
    drop(manager);

    let reopened = open(dir.path(), true);
    let stats = reopened.stats();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.in_flight, 0);
}

#[tokio::test]
async fn test_storage_directory_is_exclusive() {
    let dir = tempdir().unwrap();

    let _manager = open(dir.path(), false);

    assert!(FileStorage::open(dir.path()).is_err());
}
