// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Administrative cleanup of the remote collection.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tally_core::{QueryOp, RemoteRecord};

use super::remote::{RemoteStore, StoreResult};

/// Records sharing one value of the key field, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    /// The shared value, rendered as text.
    pub key: String,
    pub records: Vec<RemoteRecord>,
}

impl DuplicateGroup {
    /// The record kept by deduplication.
    pub fn keeper(&self) -> Option<&RemoteRecord> {
        self.records.first()
    }

    /// Records deduplication deletes.
    pub fn extras(&self) -> &[RemoteRecord] {
        self.records.get(1..).unwrap_or(&[])
    }
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    pub deleted: usize,
    /// Deletes that errored or found nothing to delete.
    pub failed: usize,
}

fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Group remote records by `key_field` and return groups of two or more.
///
/// Records without the field, or with a null value, are never duplicates.
/// Groups are ordered by key, records inside a group newest first.
pub async fn find_duplicates<R: RemoteStore + ?Sized>(
    store: &R,
    key_field: &str,
) -> StoreResult<Vec<DuplicateGroup>> {
    let mut groups: BTreeMap<String, Vec<RemoteRecord>> = BTreeMap::new();
    for record in store.get_all().await? {
        match record.field(key_field) {
            None | Some(Value::Null) => continue,
            Some(value) => groups.entry(key_text(value)).or_default().push(record),
        }
    }

    Ok(groups
        .into_iter()
        .filter(|(_, records)| records.len() > 1)
        .map(|(key, mut records)| {
            records.sort_by_key(|r| std::cmp::Reverse(r.timestamp()));
            DuplicateGroup { key, records }
        })
        .collect())
}

/// Keep the newest record of each duplicate group and delete the others.
///
/// Individual delete failures are logged and counted.
pub async fn remove_duplicates<R: RemoteStore + ?Sized>(
    store: &R,
    key_field: &str,
) -> StoreResult<CleanupReport> {
    let groups = find_duplicates(store, key_field).await?;
    let doomed: Vec<&RemoteRecord> = groups.iter().flat_map(|g| g.extras()).collect();
    let report = delete_all(store, doomed).await;
    tracing::info!(
        "removed {} duplicate(s) by '{}', {} failed",
        report.deleted,
        key_field,
        report.failed
    );
    Ok(report)
}

/// Delete every remote record matching `field op value`.
pub async fn purge_matching<R: RemoteStore + ?Sized>(
    store: &R,
    field: &str,
    op: QueryOp,
    value: Value,
) -> StoreResult<CleanupReport> {
    let matches = store.query(field, op, value).await?;
    let report = delete_all(store, matches.iter().collect()).await;
    tracing::info!(
        "purged {} record(s) where {} {}, {} failed",
        report.deleted,
        field,
        op,
        report.failed
    );
    Ok(report)
}

async fn delete_all<R: RemoteStore + ?Sized>(store: &R, records: Vec<&RemoteRecord>) -> CleanupReport {
    let mut report = CleanupReport::default();
    for record in records {
        match store.delete(&record.id).await {
            Ok(true) => report.deleted += 1,
            Ok(false) => {
                tracing::warn!("{} was already gone", record.id);
                report.failed += 1;
            }
            Err(e) => {
                tracing::warn!("failed to delete {}: {}", record.id, e);
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
