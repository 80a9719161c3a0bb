// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::{connect, open_manager, open_project, runtime};
use crate::display::{format_summary, ConsoleObserver};
use crate::error::{Error, Result};

pub fn run() -> Result<()> {
    let (work_dir, config) = open_project()?;
    runtime()?.block_on(async {
        let (store, online) = connect(&config).await;
        let manager = open_manager(&work_dir, &config, store, online, Arc::new(ConsoleObserver::default()))?;

        let revived = manager.revive_failed_records()?;
        if revived == 0 {
            println!("No failed records");
            return Ok(());
        }
        println!("Revived {} failed record(s)", revived);

        let summary = manager.sync_pending_records().await?;
        println!("{}", format_summary(&summary));
        Ok::<_, Error>(())
    })
}
