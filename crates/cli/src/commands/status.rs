// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::{connect, open_manager, open_project, print_json, runtime};
use crate::cli::OutputFormat;
use crate::display::format_stats;
use crate::error::Result;
use crate::sync::NoopObserver;

pub fn run(output: OutputFormat) -> Result<()> {
    let (work_dir, config) = open_project()?;
    let stats = runtime()?.block_on(async {
        let (store, online) = connect(&config).await;
        let manager = open_manager(&work_dir, &config, store, online, Arc::new(NoopObserver))?;
        Ok::<_, crate::error::Error>(manager.stats())
    })?;

    match output {
        OutputFormat::Text => println!("{}", format_stats(&stats)),
        OutputFormat::Json => print_json(&stats)?,
    }
    Ok(())
}
