// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host connectivity state.
//!
//! [`Connectivity`] is the source of online/offline transitions consumed by
//! the sync manager. Whatever knows about the network (an OS hook, the
//! reachability probe below, a test) flips it with [`Connectivity::set_online`];
//! subscribers only see actual changes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shared online flag with change notification. Clones share state.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Connectivity { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Update the state. Returns true if it changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Periodically run `probe` and publish its answer.
    ///
    /// The first probe runs immediately. The task stops when the returned
    /// handle is aborted.
    pub fn spawn_probe<F, Fut>(&self, every: Duration, probe: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let connectivity = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let online = probe().await;
                if connectivity.set_online(online) {
                    tracing::info!("connectivity changed: {}", if online { "online" } else { "offline" });
                }
            }
        })
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Connectivity::new(false)
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
