// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-side maintenance: duplicate removal and bulk purges.

use tally_core::QueryOp;

use super::{open_project, parse_value, print_json, require_remote, runtime};
use crate::cli::OutputFormat;
use crate::display::format_timestamp;
use crate::error::{Error, Result};
use crate::sync::{find_duplicates, purge_matching, remove_duplicates, CleanupReport};

pub fn dedupe(field: String, apply: bool, output: OutputFormat) -> Result<()> {
    let (_, config) = open_project()?;
    runtime()?.block_on(async {
        let store = require_remote(&config).await?;

        if apply {
            let report = remove_duplicates(&store, &field).await?;
            match output {
                OutputFormat::Text => print_report("Deleted", "duplicate", &report),
                OutputFormat::Json => print_json(&report)?,
            }
            return Ok(());
        }

        let groups = find_duplicates(&store, &field).await?;
        if output == OutputFormat::Json {
            return print_json(&groups);
        }
        if groups.is_empty() {
            println!("No duplicates by '{}'", field);
            return Ok(());
        }
        for group in &groups {
            println!("{} = {} ({} records)", field, group.key, group.records.len());
            for (i, record) in group.records.iter().enumerate() {
                let ts = format_timestamp(record.timestamp());
                let tag = if i == 0 { "keep" } else { "drop" };
                println!("  {}  {}  {}", tag, record.id, ts);
            }
        }
        let extras: usize = groups.iter().map(|g| g.extras().len()).sum();
        println!();
        println!("{} duplicate(s); run with --apply to delete them", extras);
        Ok::<_, Error>(())
    })
}

pub fn purge(field: String, op: QueryOp, value: String, yes: bool) -> Result<()> {
    if !yes {
        return Err(Error::ConfirmationRequired("delete remote records"));
    }
    let (_, config) = open_project()?;
    runtime()?.block_on(async {
        let store = require_remote(&config).await?;
        let report = purge_matching(&store, &field, op, parse_value(&value)).await?;
        print_report("Purged", "record", &report);
        Ok::<_, Error>(())
    })
}

fn print_report(verb: &str, noun: &str, report: &CleanupReport) {
    if report.failed > 0 {
        println!(
            "{} {} {}(s), {} failed",
            verb, report.deleted, noun, report.failed
        );
    } else {
        println!("{} {} {}(s)", verb, report.deleted, noun);
    }
}
