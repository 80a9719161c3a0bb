// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground sync loop: the long-lived host of the sync manager.

use std::sync::Arc;

use tally_core::FileStorage;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{connect, open_project, runtime};
use crate::config::RemoteConfig;
use crate::display::{format_stats, ConsoleObserver};
use crate::error::Result;
use crate::sync::{Connectivity, SyncManager, WebSocketStore};

pub fn run() -> Result<()> {
    let (work_dir, config) = open_project()?;
    let storage = FileStorage::open(&work_dir)?;
    let Some(remote) = config.remote.clone() else {
        println!("No remote configured: nothing to watch");
        return Ok(());
    };

    runtime()?.block_on(async {
        let (store, online) = connect(&config).await;
        let manager = SyncManager::builder(store, storage)
            .config(config.sync.to_sync_config())
            .connectivity(Connectivity::new(online))
            .observer(Arc::new(ConsoleObserver { show_status: true }))
            .start();

        println!(
            "Watching {} ({}), Ctrl-C to stop",
            remote.url,
            if online { "online" } else { "offline" }
        );
        if online {
            manager.spawn_sync();
        }

        let reachability = spawn_reachability_check(manager.connectivity(), &remote);

        let mut refresh = tokio::time::interval(config.sync.status_refresh());
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
        refresh.tick().await;

        loop {
            tokio::select! {
                _ = refresh.tick() => println!("{}\n", format_stats(&manager.stats())),
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        tracing::warn!("failed to listen for Ctrl-C: {}", e);
                    }
                    break;
                }
            }
        }

        reachability.abort();
        manager.shutdown();
        manager.remote().disconnect().await;
        println!("Stopped");
    });
    Ok(())
}

/// Ping the remote periodically on a connection of its own and publish the
/// answer to `connectivity`.
pub(crate) fn spawn_reachability_check(
    connectivity: &Connectivity,
    remote: &RemoteConfig,
) -> JoinHandle<()> {
    let timeout = remote.connect_timeout();
    let store = Arc::new(WebSocketStore::new(remote.url.clone()).with_connect_timeout(timeout));
    connectivity.spawn_probe(remote.probe_interval(), move || {
        let store = Arc::clone(&store);
        async move { matches!(tokio::time::timeout(timeout, store.ping()).await, Ok(Ok(()))) }
    })
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
