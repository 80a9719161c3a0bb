// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::StoreError;

/// All possible errors that can occur in the tally library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'tally init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid field '{0}'\n  hint: use key=value, e.g. -f name=Ana")]
    InvalidField(String),

    #[error("invalid payload: {0}\n  hint: pass a JSON object, e.g. '{{\"name\": \"Ana\"}}'")]
    InvalidPayload(String),

    #[error("{0} is required")]
    FieldRequired(&'static str),

    #[error("refusing to {0} without confirmation\n  hint: pass --yes to proceed")]
    ConfirmationRequired(&'static str),

    #[error("no remote configured\n  hint: add a [remote] section to .tally/config.toml or run 'tally init --remote <url>'")]
    NoRemote,

    #[error("remote unreachable: {0}")]
    Offline(String),

    #[error("remote error: {0}")]
    Remote(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] tally_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for tally operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
