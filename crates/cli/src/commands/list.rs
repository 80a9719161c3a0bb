// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::{connect, open_manager, open_project, print_json, runtime, Manager};
use crate::cli::OutputFormat;
use crate::display::format_record_line;
use crate::error::Result;
use crate::sync::{NoopObserver, WebSocketStore};

pub fn run(remote: bool, output: OutputFormat) -> Result<()> {
    let (work_dir, config) = open_project()?;
    if !remote {
        let manager = open_manager(
            &work_dir,
            &config,
            WebSocketStore::new(String::new()),
            false,
            Arc::new(NoopObserver),
        )?;
        return list_local(&manager, output);
    }

    let all = runtime()?.block_on(async {
        let (store, online) = connect(&config).await;
        let manager = open_manager(&work_dir, &config, store, online, Arc::new(NoopObserver))?;
        if !online && output == OutputFormat::Text {
            println!("(offline: showing local records only)");
        }
        Ok::<_, crate::error::Error>(manager.get_all_records().await)
    })?;

    match output {
        OutputFormat::Json => print_json(&all)?,
        OutputFormat::Text => {
            if all.total == 0 {
                println!("No records");
            }
            if !all.local.is_empty() {
                println!("Local ({}):", all.local.len());
                for record in &all.local {
                    println!("  {}", format_record_line(record));
                }
            }
            if !all.remote.is_empty() {
                println!("Remote ({}):", all.remote.len());
                for record in &all.remote {
                    println!("  {}", format_record_line(record));
                }
            }
        }
    }
    Ok(())
}

/// Every queued record, confirmed and dead-lettered included.
fn list_local(manager: &Manager, output: OutputFormat) -> Result<()> {
    let records = manager.records();
    match output {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No records");
            }
            for record in &records {
                println!("{}", format_record_line(record));
            }
        }
    }
    Ok(())
}
