// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-remote: WebSocket relay hosting the "votes" collection.
//!
//! Clients add, fetch, query and delete documents over a request/response
//! protocol (see [`tally_core::protocol`]). The collection is persisted as a
//! JSON-lines event log in the data directory.

pub mod server;
pub mod state;


pub use server::{run, serve};
pub use state::ServerState;
