// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.tally/config.toml` and includes:
//! - `[remote]`: Relay server URL and connection timing (absent = local-only)
//! - `[sync]`: Sync manager tuning (timer, timeouts, retry budget)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::sync::SyncConfig;

const WORK_DIR_NAME: &str = ".tally";
const CONFIG_FILE_NAME: &str = "config.toml";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Project configuration stored in `.tally/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote store configuration (optional - if absent, runs in local-only mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Remote store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL of the relay: `ws://...` or `wss://...`
    pub url: String,
    /// Max time to wait for a connection in seconds (default: 2).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Reachability probe period in seconds while watching (default: 5).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            connect_timeout_secs: default_connect_timeout_secs(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }

    /// Validates that the URL is a WebSocket URL with a host.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"));
        match rest {
            Some(host) if !host.is_empty() => None,
            Some(_) => Some(format!("remote URL '{}' has no host", self.url)),
            None => Some(format!(
                "invalid remote URL '{}': must be ws:// or wss://",
                self.url
            )),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}

/// Sync manager settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Auto-sync timer period in seconds (default: 30).
    pub interval_secs: u64,
    /// Time allowed for one record submission in seconds (default: 10).
    pub submit_timeout_secs: u64,
    /// Failed submissions before a record is dead-lettered (default: 3).
    pub max_retries: u32,
    /// Remove confirmed records at the end of each pass (default: false).
    pub prune_on_sync: bool,
    /// Status refresh period for `tally watch` in seconds (default: 10).
    pub status_refresh_secs: u64,
    /// Run the auto-sync timer in `tally watch` (default: true).
    pub auto_sync: bool,
    /// Sync right after `tally add` when the remote is reachable (default: true).
    pub sync_on_add: bool,
    /// Submissions kept outstanding at once during a pass (default: 1).
    pub max_concurrent_submissions: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            interval_secs: 30,
            submit_timeout_secs: 10,
            max_retries: 3,
            prune_on_sync: false,
            status_refresh_secs: 10,
            auto_sync: true,
            sync_on_add: true,
            max_concurrent_submissions: 1,
        }
    }
}

impl SyncSettings {
    /// Manager configuration. Zero periods are raised to one second and a
    /// zero submission window to one.
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            interval: Duration::from_secs(self.interval_secs.max(1)),
            submit_timeout: Duration::from_secs(self.submit_timeout_secs.max(1)),
            max_retries: self.max_retries,
            prune_on_sync: self.prune_on_sync,
            sync_on_add: self.sync_on_add,
            auto_sync: self.auto_sync,
            max_concurrent_submissions: self.max_concurrent_submissions.max(1),
        }
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs.max(1))
    }
}

fn default_connect_timeout_secs() -> u64 {
    2
}

fn default_probe_interval_secs() -> u64 {
    5
}

impl Config {
    /// Creates a config with an optional remote.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the remote URL is invalid.
    pub fn new(remote_url: Option<String>) -> Result<Self> {
        let remote = remote_url.map(RemoteConfig::new);
        if let Some(msg) = remote.as_ref().and_then(RemoteConfig::validate_url) {
            return Err(Error::Config(msg));
        }
        Ok(Config {
            remote,
            sync: SyncSettings::default(),
        })
    }

    /// Loads configuration from the given `.tally/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Returns the remote URL if configured.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    /// Saves configuration to the given `.tally/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Find the .tally directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Initialize a new .tally directory at the given path
pub fn init_work_dir(path: &Path, remote_url: Option<String>) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let config = Config::new(remote_url)?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// Queue, history and lock files are per-machine state.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    let content = "# Local sync state\nsyncQueue.json\nsyncStats.json\n*.tmp\n.lock\n";
    fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
