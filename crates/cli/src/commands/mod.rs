// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod cleanup;
pub mod clear;
pub mod init;
pub mod list;
pub mod retry;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tally_core::FileStorage;

use crate::config::{find_work_dir, Config};
use crate::error::{Error, Result};
use crate::sync::{Connectivity, SyncManager, SyncObserver, WebSocketStore};

/// The manager as used by commands.
pub type Manager = SyncManager<WebSocketStore, FileStorage>;

/// Helper to load the project from the current context.
pub fn open_project() -> Result<(PathBuf, Config)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    Ok((work_dir, config))
}

/// Runtime for one command invocation.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Store for the configured remote, and whether it accepted a connection.
///
/// Without a remote the store points nowhere and is reported offline, so
/// the manager never contacts it.
pub async fn connect(config: &Config) -> (WebSocketStore, bool) {
    let Some(remote) = &config.remote else {
        return (WebSocketStore::new(String::new()), false);
    };
    let store = WebSocketStore::new(remote.url.clone()).with_connect_timeout(remote.connect_timeout());
    if let Some(msg) = remote.validate_url() {
        tracing::warn!("{}", msg);
        return (store, false);
    }
    match store.connect().await {
        Ok(()) => (store, true),
        Err(e) => {
            tracing::info!("remote unreachable, working offline: {}", e);
            (store, false)
        }
    }
}

/// Connect to the configured remote or fail.
pub async fn require_remote(config: &Config) -> Result<WebSocketStore> {
    let remote = config.remote.as_ref().ok_or(Error::NoRemote)?;
    if let Some(msg) = remote.validate_url() {
        return Err(Error::Config(msg));
    }
    match connect(config).await {
        (store, true) => Ok(store),
        (_, false) => Err(Error::Offline(remote.url.clone())),
    }
}

/// Open the queue in `work_dir` for a one-shot command.
///
/// Background passes are disabled; commands run passes themselves so they
/// finish before the process exits.
pub fn open_manager(
    work_dir: &Path,
    config: &Config,
    store: WebSocketStore,
    online: bool,
    observer: Arc<dyn SyncObserver>,
) -> Result<Manager> {
    let storage = FileStorage::open(work_dir)?;
    let mut sync_config = config.sync.to_sync_config();
    sync_config.sync_on_add = false;
    sync_config.auto_sync = false;

    Ok(SyncManager::builder(store, storage)
        .config(sync_config)
        .connectivity(Connectivity::new(online))
        .observer(observer)
        .build())
}

/// Parse a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
