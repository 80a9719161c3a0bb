// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for records, stats and sync events.

use chrono::{DateTime, Utc};
use tally_core::Record;

use crate::sync::{SkipReason, SyncObserver, SyncStats, SyncStatus, SyncSummary};

/// Short lifecycle label for a queued record.
pub fn record_state(record: &Record) -> &'static str {
    if record.failed {
        "failed"
    } else if record.synced {
        "synced"
    } else {
        "pending"
    }
}

/// Format epoch milliseconds as UTC, falling back to the raw number.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// One-line listing: id, state, creation time, payload.
pub fn format_record_line(record: &Record) -> String {
    let payload = serde_json::to_string(&record.payload).unwrap_or_default();
    format!(
        "{}  {:<7}  {}  {}",
        record.id,
        record_state(record),
        format_timestamp(record.timestamp),
        payload
    )
}

pub fn format_stats(stats: &SyncStats) -> String {
    let mut lines = vec![
        format!(
            "Status: {}",
            if stats.is_online { "online" } else { "offline" }
        ),
        if stats.in_flight > 0 {
            format!("Pending: {} ({} in flight)", stats.pending, stats.in_flight)
        } else {
            format!("Pending: {}", stats.pending)
        },
        format!("Synced: {}", stats.synced),
    ];
    if stats.failed > 0 {
        lines.push(format!("Failed: {} (run 'tally retry')", stats.failed));
    }
    lines.push(format!("Total: {}", stats.total));
    lines.push(format!(
        "All-time: {} synced, {} failed attempt(s)",
        stats.total_synced, stats.total_failed
    ));
    lines.push(match (stats.last_sync, stats.last_duration_ms) {
        (Some(at), Some(ms)) => format!("Last sync: {} ({}ms)", at.format("%Y-%m-%d %H:%M:%S UTC"), ms),
        (Some(at), None) => format!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        _ => "Last sync: never".to_string(),
    });
    lines.join("\n")
}

pub fn format_summary(summary: &SyncSummary) -> String {
    match summary.skipped {
        Some(SkipReason::Offline) => "Offline: records kept locally".to_string(),
        Some(SkipReason::NothingPending) => "Nothing to sync".to_string(),
        None => {
            let mut out = format!(
                "Synced {} of {} record(s)",
                summary.synced, summary.attempted
            );
            if summary.failed > 0 {
                out.push_str(&format!(", {} failed", summary.failed));
            }
            if summary.dead_lettered > 0 {
                out.push_str(&format!(", {} gave up", summary.dead_lettered));
            }
            if summary.pruned > 0 {
                out.push_str(&format!(", {} pruned", summary.pruned));
            }
            out
        }
    }
}

/// Prints sync events to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver {
    /// Also print status indicator changes.
    pub show_status: bool,
}

impl SyncObserver for ConsoleObserver {
    fn record_synced(&self, old_id: &str, record: &Record) {
        println!("✓ {} → {}", old_id, record.id);
    }

    fn status_changed(&self, status: SyncStatus) {
        if self.show_status {
            println!("[{}]", status);
        }
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
