// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Holds the "votes" collection in memory, backed by a JSON-lines event log
//! that is replayed on startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use serde_json::Value;
use tally_core::record::LOCAL_ID_FIELD;
use tally_core::{identity, jsonl, FieldQuery, Payload, RemoteRecord, Result};

/// File name of the collection log inside the data directory.
pub const LOG_FILE: &str = "votes.jsonl";

/// One durable change to the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event {
    Added { id: String, data: Payload },
    Deleted { id: String },
}

/// Shared server state containing the collection.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<Mutex<Collection>>,
}

struct Collection {
    log_path: PathBuf,
    /// Documents in insertion order.
    records: Vec<RemoteRecord>,
}

impl Collection {
    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// The record created from the same client-side record, if any.
    fn created_from(&self, local_id: &str) -> Option<&RemoteRecord> {
        self.records
            .iter()
            .find(|r| r.field(LOCAL_ID_FIELD).and_then(Value::as_str) == Some(local_id))
    }
}

impl ServerState {
    /// Opens the collection in `data_dir`, replaying its log.
    ///
    /// A torn final line is dropped and the log compacted so later appends
    /// start on a clean line.
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let log_path = data_dir.join(LOG_FILE);

        let replay = jsonl::replay::<Event>(&log_path)?;
        let mut records: Vec<RemoteRecord> = Vec::new();
        for event in replay.events {
            match event {
                Event::Added { id, data } => records.push(RemoteRecord::new(id, data)),
                Event::Deleted { id } => records.retain(|r| r.id != id),
            }
        }

        if replay.torn_tail {
            warn!("dropping torn final line of {}", log_path.display());
            let live: Vec<Event> = records
                .iter()
                .map(|r| Event::Added {
                    id: r.id.clone(),
                    data: r.data.clone(),
                })
                .collect();
            jsonl::rewrite(&log_path, &live)?;
        }

        info!("loaded {} record(s) from {}", records.len(), log_path.display());

        Ok(ServerState {
            inner: Arc::new(Mutex::new(Collection { log_path, records })),
        })
    }

    /// Stores a document under a fresh id and returns the id.
    ///
    /// A document whose local id is already stored is not added again; the
    /// existing id is returned instead. The event is durable before the id
    /// is returned.
    pub async fn add(&self, data: Payload) -> Result<String> {
        let mut collection = self.inner.lock().await;
        if let Some(local_id) = data.get(LOCAL_ID_FIELD).and_then(Value::as_str) {
            if let Some(existing) = collection.created_from(local_id) {
                info!("{} already stored as {}", local_id, existing.id);
                return Ok(existing.id.clone());
            }
        }
        let id = identity::generate_remote_id();
        jsonl::append(
            &collection.log_path,
            &Event::Added {
                id: id.clone(),
                data: data.clone(),
            },
        )?;
        collection.records.push(RemoteRecord::new(id.clone(), data));
        Ok(id)
    }

    pub async fn all(&self) -> Vec<RemoteRecord> {
        self.inner.lock().await.records.clone()
    }

    pub async fn get(&self, id: &str) -> Option<RemoteRecord> {
        let collection = self.inner.lock().await;
        collection.position(id).map(|i| collection.records[i].clone())
    }

    /// Removes a document. Returns false if the id was unknown.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut collection = self.inner.lock().await;
        let Some(index) = collection.position(id) else {
            return Ok(false);
        };
        jsonl::append(&collection.log_path, &Event::Deleted { id: id.to_string() })?;
        collection.records.remove(index);
        Ok(true)
    }

    /// Documents matching `query`, in insertion order.
    pub async fn query(&self, query: &FieldQuery) -> Vec<RemoteRecord> {
        self.inner
            .lock()
            .await
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
