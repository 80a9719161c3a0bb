// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Handles client connections and request routing. Every request is
//! answered on the connection it arrived on; a request that cannot be
//! parsed or served gets an `error` reply and the connection stays open.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use tally_core::protocol::{ClientMessage, ServerMessage};
use tally_core::FieldQuery;

use crate::state::ServerState;

/// Run the WebSocket server on the given address.
pub async fn run(
    addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    serve(listener, state).await
}

/// Accept connections on an already bound listener until it fails.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = handle_client_message(&text, &state).await;
                ws_sink.send(Message::Text(response.to_json()?.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(Message::Binary(_)) => {
                let reply = ServerMessage::error(None, "binary frames are not supported");
                ws_sink.send(Message::Text(reply.to_json()?.into())).await?;
            }
            Ok(_) => {
                // Pong, Frame
            }
            Err(e) => {
                warn!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process one request and build its reply.
async fn handle_client_message(text: &str, state: &ServerState) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Malformed request: {}", e);
            return ServerMessage::error(salvage_request_id(text), format!("malformed request: {}", e));
        }
    };
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::Add { request_id, data } => match state.add(data).await {
            Ok(id) => {
                debug!("Stored record {}", id);
                ServerMessage::added(request_id, id)
            }
            Err(e) => {
                error!("Failed to store record: {}", e);
                ServerMessage::error(Some(request_id), e.to_string())
            }
        },

        ClientMessage::GetAll { request_id } => {
            let records = state.all().await;
            debug!("GetAll response: {} records", records.len());
            ServerMessage::records(request_id, records)
        }

        ClientMessage::Get { request_id, id } => ServerMessage::record(request_id, state.get(&id).await),

        ClientMessage::Delete { request_id, id } => match state.delete(&id).await {
            Ok(existed) => ServerMessage::deleted(request_id, existed),
            Err(e) => {
                error!("Failed to delete record {}: {}", id, e);
                ServerMessage::error(Some(request_id), e.to_string())
            }
        },

        ClientMessage::Query {
            request_id,
            field,
            op,
            value,
        } => {
            let records = state.query(&FieldQuery::new(field, op, value)).await;
            debug!("Query response: {} records", records.len());
            ServerMessage::records(request_id, records)
        }

        ClientMessage::Ping { id } => {
            debug!("Ping received: {}", id);
            ServerMessage::pong(id)
        }
    }
}

/// Best-effort `request_id` of a request that failed to parse, so the
/// client can still match the error to its request.
fn salvage_request_id(text: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(text).ok()?;
    value
        .get("request_id")
        .or_else(|| value.get("id"))
        .and_then(Value::as_u64)
}
