// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync manager.
//!
//! Buffers locally created records in a persisted queue, flushes them to the
//! remote store when online, and swaps each record's local id for the id the
//! store assigns.
//!
//! Sync passes may overlap (timer, connectivity transition, manual trigger).
//! A record is marked in flight before its submission starts and passes skip
//! in-flight records, so a record is never submitted twice concurrently.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use tally_core::{identity, LocalStorage, Payload, Record, Result};

use super::connectivity::Connectivity;
use super::observer::{NoopObserver, SyncObserver, SyncStatus};
use super::remote::{RemoteStore, StoreError};
use super::stats::{AllRecords, SkipReason, SyncHistory, SyncStats, SyncSummary};

/// Storage key holding the serialized queue.
pub const QUEUE_KEY: &str = "syncQueue";

/// Storage key holding the serialized [`SyncHistory`].
pub const STATS_KEY: &str = "syncStats";

/// Tuning for a [`SyncManager`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Auto-sync timer period.
    pub interval: Duration,
    /// Time allowed for one remote submission.
    pub submit_timeout: Duration,
    /// Failed submissions before a record is dead-lettered.
    pub max_retries: u32,
    /// Drop confirmed records from the queue at the end of each pass.
    pub prune_on_sync: bool,
    /// Start a pass right after a record is added while online.
    pub sync_on_add: bool,
    /// Run the auto-sync timer when the manager is started.
    pub auto_sync: bool,
    /// Submissions a pass keeps outstanding at once. Zero is treated as one.
    ///
    /// Each submission's timeout starts when that submission starts, so a
    /// remote that serializes requests only sees this many at a time.
    pub max_concurrent_submissions: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(10),
            max_retries: 3,
            prune_on_sync: false,
            sync_on_add: true,
            auto_sync: true,
            max_concurrent_submissions: 1,
        }
    }
}

#[derive(Default)]
struct QueueState {
    /// Insertion order is creation order.
    records: Vec<Record>,
    /// Ids of records with an outstanding submission.
    in_flight: HashSet<String>,
}

struct Inner<R, S> {
    remote: R,
    storage: S,
    config: SyncConfig,
    queue: Mutex<QueueState>,
    history: Mutex<SyncHistory>,
    online: AtomicBool,
    connectivity: Connectivity,
    observer: Arc<dyn SyncObserver>,
    timer: Mutex<Option<JoinHandle<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<R, S> Drop for Inner<R, S> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.abort();
        }
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

/// Result of one record's submission.
enum Outcome {
    /// Confirmed under the given remote id.
    Synced(String),
    Failed,
    DeadLettered,
}

/// Builder for [`SyncManager`].
pub struct SyncManagerBuilder<R, S> {
    remote: R,
    storage: S,
    config: SyncConfig,
    observer: Arc<dyn SyncObserver>,
    connectivity: Connectivity,
}

impl<R: RemoteStore + 'static, S: LocalStorage + 'static> SyncManagerBuilder<R, S> {
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Connectivity source. Defaults to a fresh, offline one.
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Load persisted state and construct the manager without starting any
    /// background task.
    ///
    /// An unreadable or corrupt queue loads as empty.
    pub fn build(self) -> SyncManager<R, S> {
        let records: Vec<Record> = load_or_default(&self.storage, QUEUE_KEY);
        let history: SyncHistory = load_or_default(&self.storage, STATS_KEY);
        let online = self.connectivity.is_online();

        tracing::debug!(
            "loaded sync queue: {} record(s), {}",
            records.len(),
            if online { "online" } else { "offline" }
        );

        SyncManager {
            inner: Arc::new(Inner {
                remote: self.remote,
                storage: self.storage,
                config: self.config,
                queue: Mutex::new(QueueState {
                    records,
                    in_flight: HashSet::new(),
                }),
                history: Mutex::new(history),
                online: AtomicBool::new(online),
                connectivity: self.connectivity,
                observer: self.observer,
                timer: Mutex::new(None),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Build, then subscribe to connectivity transitions and start the
    /// auto-sync timer if enabled. Must be called inside a tokio runtime.
    pub fn start(self) -> SyncManager<R, S> {
        let manager = self.build();
        manager.start_listener();
        if manager.inner.config.auto_sync {
            manager.start_auto_sync();
        }
        manager
    }
}

/// Offline-first sync manager.
///
/// Cheap to clone; clones share the same queue.
pub struct SyncManager<R, S> {
    inner: Arc<Inner<R, S>>,
}

impl<R, S> Clone for SyncManager<R, S> {
    fn clone(&self) -> Self {
        SyncManager {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RemoteStore + 'static, S: LocalStorage + 'static> SyncManager<R, S> {
    pub fn builder(remote: R, storage: S) -> SyncManagerBuilder<R, S> {
        SyncManagerBuilder {
            remote,
            storage,
            config: SyncConfig::default(),
            observer: Arc::new(NoopObserver),
            connectivity: Connectivity::default(),
        }
    }

    fn from_weak(weak: &Weak<Inner<R, S>>) -> Option<Self> {
        weak.upgrade().map(|inner| SyncManager { inner })
    }

    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.inner.connectivity
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Snapshot of the local queue in insertion order.
    pub fn records(&self) -> Vec<Record> {
        self.inner.queue.lock().records.clone()
    }

    /// Queue a new record under a fresh local id and persist the queue.
    ///
    /// The stored record is returned before any sync starts. When online and
    /// `sync_on_add` is set, a best-effort pass is spawned in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue could not be persisted; the record is
    /// not queued in that case.
    pub fn add_local_record(&self, payload: Payload) -> Result<Record> {
        let record = Record::new_local(payload, identity::now_ms());

        {
            let mut queue = self.inner.queue.lock();
            queue.records.push(record.clone());
            if let Err(e) = self.persist_queue(&queue.records) {
                queue.records.pop();
                return Err(e);
            }
        }
        tracing::debug!("queued {}", record.id);

        if self.inner.config.sync_on_add && self.is_online() {
            self.spawn_sync();
        }
        Ok(record)
    }

    /// Submit every pending record to the remote store.
    ///
    /// Up to `max_concurrent_submissions` submissions are outstanding at a
    /// time and each is reconciled as it completes.
    /// Remote failures never abort the pass: each failure bumps the record's
    /// retry count and dead-letters it once `max_retries` is reached.
    ///
    /// # Errors
    ///
    /// Only local persistence failures are returned, after every submission
    /// of the pass has settled.
    pub async fn sync_pending_records(&self) -> Result<SyncSummary> {
        if !self.is_online() {
            tracing::debug!("offline, skipping sync");
            return Ok(SyncSummary::skipped(SkipReason::Offline));
        }

        let batch: Vec<(String, Payload)> = {
            let mut guard = self.inner.queue.lock();
            let queue = &mut *guard;
            let batch: Vec<(String, Payload)> = queue
                .records
                .iter()
                .filter(|r| r.is_pending() && !queue.in_flight.contains(&r.id))
                .map(|r| (r.id.clone(), r.to_document()))
                .collect();
            for (id, _) in &batch {
                queue.in_flight.insert(id.clone());
            }
            batch
        };

        if batch.is_empty() {
            tracing::debug!("nothing to sync");
            return Ok(SyncSummary::skipped(SkipReason::NothingPending));
        }

        let started = Instant::now();
        let attempted = batch.len();
        tracing::info!("syncing {} pending record(s)", attempted);
        self.inner.observer.status_changed(SyncStatus::Syncing);

        let window = self.inner.config.max_concurrent_submissions.max(1);
        let results: Vec<Result<Outcome>> = stream::iter(batch)
            .map(|(local_id, doc)| self.submit(local_id, doc))
            .buffer_unordered(window)
            .collect()
            .await;

        let mut summary = SyncSummary {
            attempted,
            ..Default::default()
        };
        let mut confirmed = HashSet::new();
        let mut first_err = None;
        for result in results {
            match result {
                Ok(Outcome::Synced(remote_id)) => {
                    summary.synced += 1;
                    confirmed.insert(remote_id);
                }
                Ok(Outcome::Failed) => summary.failed += 1,
                Ok(Outcome::DeadLettered) => {
                    summary.failed += 1;
                    summary.dead_lettered += 1;
                }
                Err(e) => {
                    tracing::error!("failed to persist sync queue: {}", e);
                    first_err.get_or_insert(e);
                }
            }
        }

        if self.inner.config.prune_on_sync && !confirmed.is_empty() {
            match self.remove_where(|r| r.synced && confirmed.contains(&r.id)) {
                Ok(pruned) => summary.pruned = pruned,
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }

        summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.finish_pass(&summary);

        match first_err {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Submit one document and apply the outcome to the queue.
    ///
    /// The timeout covers this submission only and starts on first poll.
    async fn submit(&self, local_id: String, doc: Payload) -> Result<Outcome> {
        let timeout = self.inner.config.submit_timeout;
        let result = match tokio::time::timeout(timeout, self.inner.remote.add(doc)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(timeout)),
        };

        match result {
            Ok(remote_id) => self.confirm(&local_id, remote_id),
            Err(e) => self.record_failure(&local_id, &e),
        }
    }

    fn confirm(&self, local_id: &str, remote_id: String) -> Result<Outcome> {
        let confirmed = {
            let mut guard = self.inner.queue.lock();
            let queue = &mut *guard;
            queue.in_flight.remove(local_id);
            match queue.records.iter_mut().find(|r| r.id == local_id) {
                Some(record) => {
                    record.mark_synced(remote_id.clone());
                    let confirmed = record.clone();
                    self.persist_queue(&queue.records)?;
                    Some(confirmed)
                }
                None => None,
            }
        };

        match confirmed {
            Some(record) => {
                tracing::info!("synced {} as {}", local_id, record.id);
                self.inner.observer.record_synced(local_id, &record);
            }
            // Cleared locally while the submission was outstanding
            None => tracing::warn!("{} synced as {} but is no longer queued", local_id, remote_id),
        }
        Ok(Outcome::Synced(remote_id))
    }

    fn record_failure(&self, local_id: &str, err: &StoreError) -> Result<Outcome> {
        let max_retries = self.inner.config.max_retries;
        let mut guard = self.inner.queue.lock();
        let queue = &mut *guard;
        queue.in_flight.remove(local_id);

        let Some(record) = queue.records.iter_mut().find(|r| r.id == local_id) else {
            tracing::warn!("failed to sync {}: {}", local_id, err);
            return Ok(Outcome::Failed);
        };

        record.retries += 1;
        let outcome = if record.retries >= max_retries {
            record.failed = true;
            tracing::error!(
                "giving up on {} after {} attempt(s): {}",
                local_id,
                record.retries,
                err
            );
            Outcome::DeadLettered
        } else {
            tracing::warn!(
                "failed to sync {} (attempt {}/{}): {}",
                local_id,
                record.retries,
                max_retries,
                err
            );
            Outcome::Failed
        };

        self.persist_queue(&queue.records)?;
        Ok(outcome)
    }

    /// Update history and notify the observer at the end of a pass.
    fn finish_pass(&self, summary: &SyncSummary) {
        {
            let mut history = self.inner.history.lock();
            history.record_pass(summary, chrono::Utc::now());
            if let Err(e) = self.persist_json(STATS_KEY, &*history) {
                tracing::warn!("failed to persist sync history: {}", e);
            }
        }

        tracing::info!(
            "sync pass finished: {} synced, {} failed, {} dead-lettered in {}ms",
            summary.synced,
            summary.failed,
            summary.dead_lettered,
            summary.duration_ms
        );

        let status = if summary.synced == 0 && summary.failed > 0 {
            SyncStatus::Error
        } else if self.is_online() {
            SyncStatus::Online
        } else {
            SyncStatus::Offline
        };
        self.inner.observer.status_changed(status);
        self.inner.observer.pass_finished(summary);
    }

    /// Unsynced local records plus a fresh fetch of the remote collection.
    ///
    /// No remote call is made while offline. A failed fetch is logged and
    /// reported as an empty remote list.
    pub async fn get_all_records(&self) -> AllRecords {
        let local: Vec<Record> = self
            .inner
            .queue
            .lock()
            .records
            .iter()
            .filter(|r| !r.synced)
            .cloned()
            .collect();

        let remote = if self.is_online() {
            match self.inner.remote.get_all().await {
                Ok(docs) => docs.into_iter().map(Record::from_remote).collect(),
                Err(e) => {
                    tracing::warn!("failed to fetch remote records: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let total = local.len() + remote.len();
        AllRecords {
            local,
            remote,
            total,
        }
    }

    /// Drop confirmed records from the queue. Returns how many were removed.
    pub fn clear_synced_records(&self) -> Result<usize> {
        let removed = self.remove_where(|r| r.synced)?;
        tracing::info!("cleared {} synced record(s)", removed);
        Ok(removed)
    }

    /// Empty the queue, pending records included.
    pub fn clear_all_local_records(&self) -> Result<usize> {
        let removed = self.remove_where(|_| true)?;
        tracing::warn!("cleared all {} local record(s)", removed);
        Ok(removed)
    }

    /// Drop dead-lettered records.
    pub fn clear_failed_records(&self) -> Result<usize> {
        let removed = self.remove_where(|r| r.failed)?;
        tracing::info!("cleared {} failed record(s)", removed);
        Ok(removed)
    }

    /// Make dead-lettered records pending again with a fresh retry budget.
    pub fn revive_failed_records(&self) -> Result<usize> {
        let mut queue = self.inner.queue.lock();
        let mut revived = 0;
        for record in queue.records.iter_mut().filter(|r| r.failed) {
            record.failed = false;
            record.retries = 0;
            revived += 1;
        }
        if revived > 0 {
            self.persist_queue(&queue.records)?;
            tracing::info!("revived {} failed record(s)", revived);
        }
        Ok(revived)
    }

    /// Revive dead-lettered records, then run a sync pass.
    pub async fn retry_failed_records(&self) -> Result<SyncSummary> {
        self.revive_failed_records()?;
        self.sync_pending_records().await
    }

    /// Current counts. Pure read.
    pub fn stats(&self) -> SyncStats {
        let (pending, in_flight, synced, failed, total) = {
            let queue = self.inner.queue.lock();
            let records = &queue.records;
            (
                records.iter().filter(|r| r.is_pending()).count(),
                queue.in_flight.len(),
                records.iter().filter(|r| r.synced).count(),
                records.iter().filter(|r| r.failed).count(),
                records.len(),
            )
        };
        let history = self.inner.history.lock().clone();

        SyncStats {
            pending,
            in_flight,
            synced,
            failed,
            total,
            is_online: self.is_online(),
            auto_sync_running: self.is_auto_sync_running(),
            total_synced: history.total_synced,
            total_failed: history.total_failed,
            last_sync: history.last_sync_time,
            last_duration_ms: history.last_duration_ms,
        }
    }

    /// Lifetime sync counters.
    pub fn history(&self) -> SyncHistory {
        self.inner.history.lock().clone()
    }

    /// Switch to online and spawn a best-effort sync pass.
    ///
    /// The pass is not awaited; its errors are logged. Returns its handle,
    /// or `None` outside a tokio runtime.
    pub fn handle_online(&self) -> Option<JoinHandle<()>> {
        self.inner.online.store(true, Ordering::SeqCst);
        tracing::info!("connection restored");
        self.inner.observer.status_changed(SyncStatus::Online);
        self.spawn_sync()
    }

    /// Switch to offline. Outstanding submissions are left to settle.
    pub fn handle_offline(&self) {
        self.inner.online.store(false, Ordering::SeqCst);
        tracing::info!("connection lost, records will be kept locally");
        self.inner.observer.status_changed(SyncStatus::Offline);
    }

    /// Run a sync pass in the background.
    pub fn spawn_sync(&self) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no runtime, sync deferred");
            return None;
        };
        let manager = self.clone();
        Some(runtime.spawn(async move {
            if let Err(e) = manager.sync_pending_records().await {
                tracing::error!("background sync failed: {}", e);
            }
        }))
    }

    /// Start the periodic sync timer, replacing any running one.
    ///
    /// The first tick fires one interval from now. Ticks while offline do
    /// nothing.
    pub fn start_auto_sync(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no runtime, auto-sync not started");
            return;
        };
        let every = self.inner.config.interval;
        let weak = Arc::downgrade(&self.inner);

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(manager) = Self::from_weak(&weak) else {
                    break;
                };
                if !manager.is_online() {
                    continue;
                }
                if let Err(e) = manager.sync_pending_records().await {
                    tracing::error!("auto-sync failed: {}", e);
                }
            }
        });

        if let Some(previous) = self.inner.timer.lock().replace(task) {
            previous.abort();
        }
        tracing::debug!("auto-sync every {:?}", every);
    }

    pub fn stop_auto_sync(&self) {
        if let Some(timer) = self.inner.timer.lock().take() {
            timer.abort();
            tracing::debug!("auto-sync stopped");
        }
    }

    pub fn is_auto_sync_running(&self) -> bool {
        self.inner
            .timer
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Stop the timer and the connectivity listener.
    pub fn shutdown(&self) {
        self.stop_auto_sync();
        if let Some(listener) = self.inner.listener.lock().take() {
            listener.abort();
        }
    }

    fn start_listener(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no runtime, connectivity changes will be ignored");
            return;
        };
        let mut rx = self.inner.connectivity.subscribe();
        let weak = Arc::downgrade(&self.inner);

        let task = runtime.spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                let Some(manager) = Self::from_weak(&weak) else {
                    break;
                };
                if online {
                    manager.handle_online();
                } else {
                    manager.handle_offline();
                }
            }
        });

        if let Some(previous) = self.inner.listener.lock().replace(task) {
            previous.abort();
        }
    }

    /// Remove matching records and persist. Returns the number removed.
    fn remove_where(&self, pred: impl Fn(&Record) -> bool) -> Result<usize> {
        let mut queue = self.inner.queue.lock();
        let before = queue.records.len();
        queue.records.retain(|r| !pred(r));
        let removed = before - queue.records.len();
        self.persist_queue(&queue.records)?;
        Ok(removed)
    }

    fn persist_queue(&self, records: &[Record]) -> Result<()> {
        self.persist_json(QUEUE_KEY, records)
    }

    fn persist_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.inner.storage.set_item(key, &json)
    }
}

/// Read and parse a stored value, falling back to the default on any error.
fn load_or_default<T: DeserializeOwned + Default>(storage: &impl LocalStorage, key: &str) -> T {
    match storage.get_item(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("discarding unreadable '{}': {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("failed to read '{}': {}", key, e);
            T::default()
        }
    }
}
