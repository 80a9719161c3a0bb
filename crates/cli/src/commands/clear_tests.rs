// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::config::init_work_dir;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;
use yare::parameterized;

/// Queue one pending record, returning the work dir and config.
fn setup(temp: &TempDir) -> (PathBuf, Config) {
    let work_dir = init_work_dir(temp.path(), None).unwrap();
    let config = Config::load(&work_dir).unwrap();
    {
        let manager = open_manager(
            &work_dir,
            &config,
            WebSocketStore::new(String::new()),
            false,
            Arc::new(NoopObserver),
        )
        .unwrap();
        let payload = json!({"name": "Ana"}).as_object().unwrap().clone();
        manager.add_local_record(payload).unwrap();
    }
    (work_dir, config)
}

#[parameterized(
    synced = { ClearTarget::Synced },
    all = { ClearTarget::All },
    failed = { ClearTarget::Failed },
)]
fn test_clear_requires_confirmation(target: ClearTarget) {
    let temp = TempDir::new().unwrap();
    let (work_dir, config) = setup(&temp);
    let result = run_impl(&work_dir, &config, target, false);
    assert!(matches!(result, Err(Error::ConfirmationRequired(_))));
}

#[parameterized(
    synced = { ClearTarget::Synced, 0 },
    failed = { ClearTarget::Failed, 0 },
    all = { ClearTarget::All, 1 },
)]
fn test_clear_pending_record(target: ClearTarget, expected: usize) {
    let temp = TempDir::new().unwrap();
    let (work_dir, config) = setup(&temp);
    assert_eq!(run_impl(&work_dir, &config, target, true).unwrap(), expected);
}

#[test]
fn test_clear_all_twice() {
    let temp = TempDir::new().unwrap();
    let (work_dir, config) = setup(&temp);
    assert_eq!(run_impl(&work_dir, &config, ClearTarget::All, true).unwrap(), 1);
    assert_eq!(run_impl(&work_dir, &config, ClearTarget::All, true).unwrap(), 0);
}
