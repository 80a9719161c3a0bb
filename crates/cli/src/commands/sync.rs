// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use super::{connect, open_manager, open_project, print_json, runtime};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::{format_summary, ConsoleObserver};
use crate::error::Result;
use crate::sync::{SkipReason, SyncSummary};

pub fn run(output: OutputFormat) -> Result<()> {
    let (work_dir, config) = open_project()?;
    let summary = runtime()?.block_on(run_impl(&work_dir, &config))?;
    match output {
        OutputFormat::Text => {
            if config.remote.is_none() {
                println!("No remote configured: records are kept locally");
            } else {
                println!("{}", format_summary(&summary));
            }
        }
        OutputFormat::Json => print_json(&summary)?,
    }
    Ok(())
}

/// Run one pass against the configured remote.
///
/// Without a remote, or when it is unreachable, the pass is skipped as
/// offline and the queue is left untouched.
pub async fn run_impl(work_dir: &Path, config: &Config) -> Result<SyncSummary> {
    if config.remote.is_none() {
        return Ok(SyncSummary::skipped(SkipReason::Offline));
    }
    let (store, online) = connect(config).await;
    let manager = open_manager(work_dir, config, store, online, Arc::new(ConsoleObserver::default()))?;
    Ok(manager.sync_pending_records().await?)
}
