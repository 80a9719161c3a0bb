// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tally_core::{Payload, Record};

use super::{connect, open_manager, open_project, parse_value, print_json, runtime};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::{format_summary, ConsoleObserver};
use crate::error::{Error, Result};

pub fn run(json: Option<String>, fields: Vec<String>, output: OutputFormat) -> Result<()> {
    let (work_dir, config) = open_project()?;
    let payload = build_payload(json.as_deref(), &fields)?;
    runtime()?.block_on(run_impl(&work_dir, &config, payload, output))?;
    Ok(())
}

/// Queue the record, then push it right away if the remote is reachable.
///
/// Returns the record as stored before syncing.
pub async fn run_impl(
    work_dir: &Path,
    config: &Config,
    payload: Payload,
    output: OutputFormat,
) -> Result<Record> {
    let (store, online) = connect(config).await;
    let observer = Arc::new(ConsoleObserver::default());
    let manager = open_manager(work_dir, config, store, online, observer)?;

    let record = manager.add_local_record(payload)?;
    match output {
        OutputFormat::Text => println!("Added {}", record.id),
        OutputFormat::Json => print_json(&record)?,
    }

    if online && config.sync.sync_on_add {
        let summary = manager.sync_pending_records().await?;
        if output == OutputFormat::Text {
            println!("{}", format_summary(&summary));
        }
    } else if output == OutputFormat::Text && config.remote.is_some() {
        println!("Remote unreachable: record kept locally");
    }

    Ok(record)
}

/// Build a payload from an optional JSON object plus `key=value` fields.
///
/// Fields are applied after the object, so they win on conflicts.
pub fn build_payload(json: Option<&str>, fields: &[String]) -> Result<Payload> {
    let mut payload = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(Error::InvalidPayload(format!(
                    "expected an object, got {}",
                    other
                )))
            }
            Err(e) => return Err(Error::InvalidPayload(e.to_string())),
        },
        None => Payload::new(),
    };

    for field in fields {
        let (key, value) = field
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidField(field.clone()))?;
        payload.insert(key.trim().to_string(), parse_value(value));
    }

    if payload.is_empty() {
        return Err(Error::FieldRequired("a JSON payload or at least one -f field"));
    }
    Ok(payload)
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
