// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote store abstraction.
//!
//! Provides a trait-based interface over the hosted vote collection that
//! enables:
//! - A WebSocket-backed store for production
//! - Mock stores for unit testing

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tally_core::{Payload, QueryOp, RemoteRecord};

/// Error type for remote store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// The store refused the request.
    #[error("rejected by store: {0}")]
    Rejected(String),

    /// No reply within the allotted time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A reply of the wrong kind arrived.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type for remote store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future returned by [`RemoteStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// The hosted "votes" collection.
///
/// Methods take `&self` so several calls may be outstanding at once;
/// implementations provide their own interior synchronization.
pub trait RemoteStore: Send + Sync {
    /// Persist a new document and return its assigned id.
    fn add(&self, data: Payload) -> StoreFuture<'_, String>;

    /// Fetch every stored document.
    fn get_all(&self) -> StoreFuture<'_, Vec<RemoteRecord>>;

    /// Fetch one document, `None` if the id is unknown.
    fn get(&self, id: &str) -> StoreFuture<'_, Option<RemoteRecord>>;

    /// Remove a document. Returns false if the id was unknown.
    fn delete(&self, id: &str) -> StoreFuture<'_, bool>;

    /// Fetch documents whose `field` satisfies `op value`.
    fn query(&self, field: &str, op: QueryOp, value: Value) -> StoreFuture<'_, Vec<RemoteRecord>>;
}
