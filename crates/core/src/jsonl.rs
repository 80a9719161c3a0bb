// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines event logs.
//!
//! Each event is one JSON line, fsynced on append. Replay tolerates a torn
//! final line (a crash mid-append) but treats corruption anywhere else as
//! an error.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Appends one event to the log, creating the file if needed.
pub fn append<T: Serialize>(path: &Path, event: &T) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;
    file.sync_all()?;

    Ok(())
}

/// Result of replaying a log.
#[derive(Debug)]
pub struct Replay<T> {
    pub events: Vec<T>,
    /// True if an unparsable final line was dropped.
    pub torn_tail: bool,
}

/// Reads every event in order.
///
/// Blank lines are skipped and a missing file replays as empty.
///
/// # Errors
///
/// Returns [`Error::CorruptedData`] if a line other than the last one fails
/// to parse.
pub fn replay<T: DeserializeOwned>(path: &Path) -> Result<Replay<T>> {
    if !path.exists() {
        return Ok(Replay {
            events: Vec::new(),
            torn_tail: false,
        });
    }

    let reader = BufReader::new(File::open(path)?);
    let lines: Vec<String> = reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut events = Vec::with_capacity(lines.len());
    let mut torn_tail = false;
    let last = lines.len().saturating_sub(1);

    for (n, line) in lines.iter().enumerate() {
        match serde_json::from_str(line) {
            Ok(event) => events.push(event),
            Err(_) if n == last => torn_tail = true,
            Err(e) => {
                return Err(Error::CorruptedData(format!(
                    "{} line {}: {}",
                    path.display(),
                    n + 1,
                    e
                )))
            }
        }
    }

    Ok(Replay { events, torn_tail })
}

/// Rewrites the log with exactly `events`, replacing existing content.
///
/// Used to compact a log down to its live state.
pub fn rewrite<T: Serialize>(path: &Path, events: &[T]) -> Result<()> {
    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = File::create(&tmp_path)?;

    for event in events {
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;
    }
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
