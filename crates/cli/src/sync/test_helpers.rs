// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tally_core::{FieldQuery, Payload, QueryOp, Record, RemoteRecord};
use tokio::sync::Semaphore;

use super::observer::{SyncObserver, SyncStatus};
use super::remote::{RemoteStore, StoreError, StoreFuture};
use super::stats::SyncSummary;

/// Build a payload from a JSON object literal.
pub fn payload(value: Value) -> Payload {
    value.as_object().unwrap().clone()
}

#[derive(Default)]
struct MockState {
    records: Vec<RemoteRecord>,
    /// Every document passed to add(), including failed attempts.
    received: Vec<Payload>,
    add_calls: usize,
    get_all_calls: usize,
    fail_next: usize,
    hang: bool,
    gate: Option<Arc<Semaphore>>,
    fail_get_all: bool,
    fail_delete: HashSet<String>,
    next_id: u64,
    /// Service time of one add(); adds are served one at a time when set.
    latency: Option<Duration>,
    /// Adds that store the document, then acknowledge after `ack_delay`.
    late_acks: usize,
    ack_delay: Duration,
    active: usize,
    peak_active: usize,
}

/// In-memory remote store with scripted failures.
///
/// Assigns ids `R1`, `R2`, ... in order of successful adds.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
    /// Single service lane used when a latency is set.
    lane: tokio::sync::Mutex<()>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` add() calls fail.
    pub fn fail_next(&self, n: usize) {
        self.state.lock().unwrap().fail_next = n;
    }

    /// Make add() never resolve.
    pub fn set_hang(&self, hang: bool) {
        self.state.lock().unwrap().hang = hang;
    }

    /// Block add() calls until permits are released.
    pub fn hold(&self) {
        self.state.lock().unwrap().gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held add() calls proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.state.lock().unwrap().gate {
            gate.add_permits(n);
        }
    }

    /// Serve add() calls one at a time, each taking `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = Some(latency);
    }

    /// Store the next `n` added documents but acknowledge them only after
    /// `delay`.
    pub fn ack_late(&self, n: usize, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.late_acks = n;
        state.ack_delay = delay;
    }

    /// Most add() calls that were outstanding at the same time.
    pub fn peak_concurrent_adds(&self) -> usize {
        self.state.lock().unwrap().peak_active
    }

    pub fn set_fail_get_all(&self, fail: bool) {
        self.state.lock().unwrap().fail_get_all = fail;
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.state.lock().unwrap().fail_delete.insert(id.to_string());
    }

    /// Store a document directly, bypassing add().
    pub fn seed(&self, id: &str, data: Payload) {
        self.state
            .lock()
            .unwrap()
            .records
            .push(RemoteRecord::new(id, data));
    }

    pub fn add_calls(&self) -> usize {
        self.state.lock().unwrap().add_calls
    }

    pub fn get_all_calls(&self) -> usize {
        self.state.lock().unwrap().get_all_calls
    }

    pub fn received(&self) -> Vec<Payload> {
        self.state.lock().unwrap().received.clone()
    }

    pub fn stored(&self) -> Vec<RemoteRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.stored().into_iter().map(|r| r.id).collect()
    }
}

/// Counts an add() as outstanding until dropped.
struct ActiveAdd<'a>(&'a Mutex<MockState>);

impl Drop for ActiveAdd<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap().active -= 1;
    }
}

fn mock_failure() -> StoreError {
    StoreError::ConnectionFailed("mock failure".into())
}

impl RemoteStore for MockStore {
    fn add(&self, data: Payload) -> StoreFuture<'_, String> {
        Box::pin(async move {
            let (gate, hang, latency) = {
                let mut state = self.state.lock().unwrap();
                state.add_calls += 1;
                state.active += 1;
                state.peak_active = state.peak_active.max(state.active);
                (state.gate.clone(), state.hang, state.latency)
            };
            let _active = ActiveAdd(&self.state);
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }
            if hang {
                std::future::pending::<()>().await;
            }
            let _lane = match latency {
                Some(latency) => {
                    let lane = self.lane.lock().await;
                    tokio::time::sleep(latency).await;
                    Some(lane)
                }
                None => None,
            };

            let (id, ack_delay) = {
                let mut state = self.state.lock().unwrap();
                state.received.push(data.clone());
                if state.fail_next > 0 {
                    state.fail_next -= 1;
                    return Err(mock_failure());
                }
                state.next_id += 1;
                let id = format!("R{}", state.next_id);
                state.records.push(RemoteRecord::new(id.clone(), data));
                let ack_delay = if state.late_acks > 0 {
                    state.late_acks -= 1;
                    Some(state.ack_delay)
                } else {
                    None
                };
                (id, ack_delay)
            };
            if let Some(delay) = ack_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(id)
        })
    }

    fn get_all(&self) -> StoreFuture<'_, Vec<RemoteRecord>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.get_all_calls += 1;
            if state.fail_get_all {
                return Err(mock_failure());
            }
            Ok(state.records.clone())
        })
    }

    fn get(&self, id: &str) -> StoreFuture<'_, Option<RemoteRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            Ok(state.records.iter().find(|r| r.id == id).cloned())
        })
    }

    fn delete(&self, id: &str) -> StoreFuture<'_, bool> {
        let id = id.to_string();
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.fail_delete.contains(&id) {
                return Err(mock_failure());
            }
            let before = state.records.len();
            state.records.retain(|r| r.id != id);
            Ok(state.records.len() < before)
        })
    }

    fn query(&self, field: &str, op: QueryOp, value: Value) -> StoreFuture<'_, Vec<RemoteRecord>> {
        let query = FieldQuery::new(field, op, value);
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            Ok(state
                .records
                .iter()
                .filter(|r| query.matches(r))
                .cloned()
                .collect())
        })
    }
}

/// Observer that records every event and keeps an external list in step.
#[derive(Default)]
pub struct RecordingObserver {
    pub synced: Mutex<Vec<(String, Record)>>,
    pub statuses: Mutex<Vec<SyncStatus>>,
    pub passes: Mutex<Vec<SyncSummary>>,
    /// Stand-in for a UI list holding the same records as the queue.
    pub external: Mutex<Vec<Record>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn statuses(&self) -> Vec<SyncStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn synced_ids(&self) -> Vec<(String, String)> {
        self.synced
            .lock()
            .unwrap()
            .iter()
            .map(|(old, record)| (old.clone(), record.id.clone()))
            .collect()
    }
}

impl SyncObserver for RecordingObserver {
    fn record_synced(&self, old_id: &str, record: &Record) {
        tally_core::record::reconcile(&mut self.external.lock().unwrap(), old_id, record);
        self.synced
            .lock()
            .unwrap()
            .push((old_id.to_string(), record.clone()));
    }

    fn status_changed(&self, status: SyncStatus) {
        self.statuses.lock().unwrap().push(status);
    }

    fn pass_finished(&self, summary: &SyncSummary) {
        self.passes.lock().unwrap().push(summary.clone());
    }
}
