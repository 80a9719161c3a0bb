// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record identifiers.
//!
//! Local ids are provisional and generated client-side:
//! `local_<epoch-ms>_<32 hex chars>`. The random suffix is a v4 UUID, so two
//! ids generated in the same millisecond collide with negligible probability.
//! Remote ids are assigned by the store and carry no prefix.

use uuid::Uuid;

/// Prefix marking a provisional, not yet confirmed identifier.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Generate a fresh local id for a record created at `now_ms`.
pub fn generate_local_id(now_ms: i64) -> String {
    format!("{}{}_{}", LOCAL_ID_PREFIX, now_ms, Uuid::new_v4().simple())
}

/// Returns true if `id` is a provisional local id.
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Generate an identifier for a newly stored remote document.
pub fn generate_remote_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
