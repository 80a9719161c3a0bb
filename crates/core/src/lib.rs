// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-core: Shared library for the tally vote-registration sync tools
//!
//! This crate provides the record model, local persistence, query and wire
//! protocol types used by both the `tally` client and the `tally-remote`
//! relay server.

pub mod error;
pub mod identity;
pub mod jsonl;
pub mod protocol;
pub mod query;
pub mod record;
pub mod storage;

pub use error::{Error, Result};
pub use query::{FieldQuery, QueryOp};
pub use record::{Payload, Record, RemoteRecord};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
