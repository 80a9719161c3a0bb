// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use super::{open_manager, open_project};
use crate::cli::ClearTarget;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sync::{NoopObserver, WebSocketStore};

pub fn run(target: ClearTarget, yes: bool) -> Result<()> {
    let (work_dir, config) = open_project()?;
    let removed = run_impl(&work_dir, &config, target, yes)?;
    let what = match target {
        ClearTarget::Synced => "synced",
        ClearTarget::All => "local",
        ClearTarget::Failed => "failed",
    };
    println!("Removed {} {} record(s)", removed, what);
    Ok(())
}

/// Clearing never talks to the remote.
pub fn run_impl(work_dir: &Path, config: &Config, target: ClearTarget, yes: bool) -> Result<usize> {
    if !yes {
        return Err(Error::ConfirmationRequired(match target {
            ClearTarget::Synced => "clear synced records",
            ClearTarget::All => "clear all local records",
            ClearTarget::Failed => "clear failed records",
        }));
    }

    let manager = open_manager(
        work_dir,
        config,
        WebSocketStore::new(String::new()),
        false,
        Arc::new(NoopObserver),
    )?;
    let removed = match target {
        ClearTarget::Synced => manager.clear_synced_records()?,
        ClearTarget::All => manager.clear_all_local_records()?,
        ClearTarget::Failed => manager.clear_failed_records()?,
    };
    Ok(removed)
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
