// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally - Offline-first vote registration with background sync.
//!
//! Registrations are recorded locally first and pushed to a remote store
//! (a `tally-remote` relay) whenever it is reachable. Each record is
//! re-keyed under the id the store assigns once the store confirms it.
//!
//! # Main Components
//!
//! - [`sync::SyncManager`] - the persisted queue and its sync passes
//! - [`sync::RemoteStore`] - the remote collection capability
//! - [`Config`] - project configuration (remote URL, sync tuning)
//! - [`Error`] - error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use tally::sync::{Connectivity, SyncManager, WebSocketStore};
//! use tally_core::FileStorage;
//!
//! let work_dir = tally::find_work_dir()?;
//! let config = tally::Config::load(&work_dir)?;
//! let manager = SyncManager::builder(WebSocketStore::new(url), FileStorage::open(&work_dir)?)
//!     .config(config.sync.to_sync_config())
//!     .connectivity(Connectivity::new(true))
//!     .start();
//! let record = manager.add_local_record(payload)?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{ClearTarget, Cli, Command, OutputFormat};
pub use config::{find_work_dir, init_work_dir, Config};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { remote, path } => commands::init::run(remote, path),
        Command::Add {
            json,
            fields,
            output,
        } => commands::add::run(json, fields, output),
        Command::Sync { output } => commands::sync::run(output),
        Command::Status { output } => commands::status::run(output),
        Command::List { remote, output } => commands::list::run(remote, output),
        Command::Clear { target, yes } => commands::clear::run(target, yes),
        Command::Retry => commands::retry::run(),
        Command::Dedupe {
            field,
            apply,
            output,
        } => commands::cleanup::dedupe(field, apply, output),
        Command::Purge {
            field,
            op,
            value,
            yes,
        } => commands::cleanup::purge(field, op, value, yes),
        Command::Watch => commands::watch::run(),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
