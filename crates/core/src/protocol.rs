// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between a sync client and the relay server.
//!
//! The protocol is request/response:
//! - Client sends a request carrying a client-chosen `request_id`
//! - Server answers with a message echoing the same `request_id`
//!
//! Several requests may be outstanding on one connection; clients match
//! replies by id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::QueryOp;
use crate::record::{Payload, RemoteRecord};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Store a new document. The server assigns its id.
    Add { request_id: u64, data: Payload },

    /// Fetch every stored document.
    GetAll { request_id: u64 },

    /// Fetch one document by id.
    Get { request_id: u64, id: String },

    /// Delete one document by id.
    Delete { request_id: u64, id: String },

    /// Fetch documents whose `field` satisfies `op value`.
    Query {
        request_id: u64,
        field: String,
        op: QueryOp,
        value: Value,
    },

    /// Ping message for keepalive and reachability probes.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to Add with the assigned id.
    Added { request_id: u64, id: String },

    /// Reply to GetAll and Query.
    Records {
        request_id: u64,
        records: Vec<RemoteRecord>,
    },

    /// Reply to Get; `None` when the id is unknown.
    Record {
        request_id: u64,
        record: Option<RemoteRecord>,
    },

    /// Reply to Delete. `existed` is false if the id was unknown.
    Deleted { request_id: u64, existed: bool },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error message.
    Error {
        /// Id of the failed request, if it could be parsed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    pub fn add(request_id: u64, data: Payload) -> Self {
        ClientMessage::Add { request_id, data }
    }

    pub fn get_all(request_id: u64) -> Self {
        ClientMessage::GetAll { request_id }
    }

    pub fn get(request_id: u64, id: impl Into<String>) -> Self {
        ClientMessage::Get {
            request_id,
            id: id.into(),
        }
    }

    pub fn delete(request_id: u64, id: impl Into<String>) -> Self {
        ClientMessage::Delete {
            request_id,
            id: id.into(),
        }
    }

    pub fn query(request_id: u64, field: impl Into<String>, op: QueryOp, value: Value) -> Self {
        ClientMessage::Query {
            request_id,
            field: field.into(),
            op,
            value,
        }
    }

    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// The id a reply to this message will carry.
    pub fn request_id(&self) -> u64 {
        match self {
            ClientMessage::Add { request_id, .. }
            | ClientMessage::GetAll { request_id }
            | ClientMessage::Get { request_id, .. }
            | ClientMessage::Delete { request_id, .. }
            | ClientMessage::Query { request_id, .. } => *request_id,
            ClientMessage::Ping { id } => *id,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    pub fn added(request_id: u64, id: impl Into<String>) -> Self {
        ServerMessage::Added {
            request_id,
            id: id.into(),
        }
    }

    pub fn records(request_id: u64, records: Vec<RemoteRecord>) -> Self {
        ServerMessage::Records {
            request_id,
            records,
        }
    }

    pub fn record(request_id: u64, record: Option<RemoteRecord>) -> Self {
        ServerMessage::Record { request_id, record }
    }

    pub fn deleted(request_id: u64, existed: bool) -> Self {
        ServerMessage::Deleted {
            request_id,
            existed,
        }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(request_id: Option<u64>, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            request_id,
            message: message.into(),
        }
    }

    /// The request this message answers, if any.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ServerMessage::Added { request_id, .. }
            | ServerMessage::Records { request_id, .. }
            | ServerMessage::Record { request_id, .. }
            | ServerMessage::Deleted { request_id, .. } => Some(*request_id),
            ServerMessage::Pong { id } => Some(*id),
            ServerMessage::Error { request_id, .. } => *request_id,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
