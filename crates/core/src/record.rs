// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Vote records as they move between local persistence and the remote store.
//!
//! A [`Record`] is a fixed envelope (`id`, `timestamp`, `synced`, `local`,
//! plus retry bookkeeping) around an opaque [`Payload`]. The sync core only
//! ever reads and writes the envelope; payload fields such as the voter's
//! name or identity number pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity;

/// Opaque domain fields of a record.
pub type Payload = serde_json::Map<String, Value>;

/// Document key carrying the local id a record was created under.
///
/// Lets the remote store recognize a resubmission of a record it already
/// holds, e.g. after an acknowledgement was lost to a timeout.
pub const LOCAL_ID_FIELD: &str = "localId";

/// Envelope keys owned by the sync core. Never stored inside a payload.
pub const ENVELOPE_FIELDS: [&str; 7] = [
    "id",
    "timestamp",
    "synced",
    "local",
    "retries",
    "failed",
    LOCAL_ID_FIELD,
];

/// A registration entry held in the local queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Local id before confirmation, remote id afterwards.
    pub id: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// True once the remote store acknowledged the record.
    #[serde(default)]
    pub synced: bool,
    /// True while the record exists only in local persistence.
    #[serde(default)]
    pub local: bool,
    /// Failed submission attempts so far.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub retries: u32,
    /// Dead-lettered: excluded from automatic sync passes.
    #[serde(default, skip_serializing_if = "is_false")]
    pub failed: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A record as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Server-assigned identifier.
    pub id: String,
    /// Stored document fields.
    pub data: Payload,
}

impl RemoteRecord {
    pub fn new(id: impl Into<String>, data: Payload) -> Self {
        RemoteRecord {
            id: id.into(),
            data,
        }
    }

    /// Creation time stored with the document, 0 when absent.
    pub fn timestamp(&self) -> i64 {
        self.data
            .get("timestamp")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Removes every envelope key from a payload.
pub fn strip_envelope(payload: &mut Payload) {
    for key in ENVELOPE_FIELDS {
        payload.remove(key);
    }
}

impl Record {
    /// Creates a provisional record with a freshly generated local id.
    ///
    /// Envelope keys the caller put in the payload are discarded, so a
    /// payload-supplied `id` never survives.
    pub fn new_local(mut payload: Payload, now_ms: i64) -> Self {
        strip_envelope(&mut payload);
        Record {
            id: identity::generate_local_id(now_ms),
            timestamp: now_ms,
            synced: false,
            local: true,
            retries: 0,
            failed: false,
            payload,
        }
    }

    /// Builds the confirmed view of a document fetched from the remote store.
    pub fn from_remote(remote: RemoteRecord) -> Self {
        let timestamp = remote.timestamp();
        let mut payload = remote.data;
        strip_envelope(&mut payload);
        Record {
            id: remote.id,
            timestamp,
            synced: true,
            local: false,
            retries: 0,
            failed: false,
            payload,
        }
    }

    /// Unsynced and not dead-lettered.
    pub fn is_pending(&self) -> bool {
        !self.synced && !self.failed
    }

    /// True while the record is still identified by a local id.
    pub fn has_local_id(&self) -> bool {
        identity::is_local_id(&self.id)
    }

    /// The document submitted to the remote store.
    ///
    /// Carries the payload, the creation timestamp and the record's id
    /// under [`LOCAL_ID_FIELD`]. Client-side bookkeeping (`id`, `local`,
    /// `synced`, `retries`, `failed`) is left out.
    pub fn to_document(&self) -> Payload {
        let mut doc = self.payload.clone();
        strip_envelope(&mut doc);
        doc.insert("timestamp".to_string(), Value::from(self.timestamp));
        doc.insert(LOCAL_ID_FIELD.to_string(), Value::from(self.id.clone()));
        doc
    }

    /// Switches the record to its confirmed identity in one step.
    pub fn mark_synced(&mut self, remote_id: impl Into<String>) {
        self.id = remote_id.into();
        self.synced = true;
        self.local = false;
        self.retries = 0;
        self.failed = false;
    }
}

/// Applies a confirmed identity to the matching entry of an external list.
///
/// Finds the record still carrying `old_id` and rewrites its `id`,
/// `synced` and `local` fields in place. Returns false when no entry holds
/// `old_id`.
pub fn reconcile(records: &mut [Record], old_id: &str, confirmed: &Record) -> bool {
    match records.iter_mut().find(|r| r.id == old_id) {
        Some(entry) => {
            entry.id = confirmed.id.clone();
            entry.synced = true;
            entry.local = false;
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
