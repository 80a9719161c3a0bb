// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote store over a WebSocket connection to `tally-remote`.
//!
//! One connection is shared by all callers and opened lazily. Requests are
//! pipelined: the connection lock is held only while a request is written,
//! and a reader task routes each reply to its caller by request id. A reply
//! for a caller that already gave up is skipped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use tally_core::protocol::{ClientMessage, ServerMessage};
use tally_core::{Payload, QueryOp, RemoteRecord};

use super::remote::{RemoteStore, StoreError, StoreFuture, StoreResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default time allowed for the WebSocket handshake.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// An open connection: the write half plus the task draining the read half.
struct Connection {
    sink: SplitSink<WsStream, Message>,
    reader: JoinHandle<()>,
    generation: u64,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

struct Waiter {
    generation: u64,
    tx: oneshot::Sender<StoreResult<ServerMessage>>,
}

/// Callers waiting for a reply, keyed by request id.
#[derive(Default)]
struct Pending {
    waiters: HashMap<u64, Waiter>,
    /// Generation whose reader is still running.
    live: Option<u64>,
}

impl Pending {
    /// Registers a waiter on a live connection. Returns `None` once that
    /// connection's reader has stopped.
    fn register(
        &mut self,
        request_id: u64,
        generation: u64,
    ) -> Option<oneshot::Receiver<StoreResult<ServerMessage>>> {
        if self.live != Some(generation) {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(request_id, Waiter { generation, tx });
        Some(rx)
    }

    /// Marks a connection dead and fails everything still waiting on it.
    fn close(&mut self, generation: u64, err: &StoreError) {
        if self.live == Some(generation) {
            self.live = None;
        }
        let orphaned: Vec<u64> = self
            .waiters
            .iter()
            .filter(|(_, w)| w.generation == generation)
            .map(|(id, _)| *id)
            .collect();
        for id in orphaned {
            if let Some(waiter) = self.waiters.remove(&id) {
                let _ = waiter.tx.send(Err(err.clone()));
            }
        }
    }
}

/// Drops a caller's waiter when the caller stops waiting.
struct WaitGuard<'a> {
    pending: &'a parking_lot::Mutex<Pending>,
    request_id: u64,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().waiters.remove(&self.request_id);
    }
}

/// WebSocket-backed [`RemoteStore`].
pub struct WebSocketStore {
    url: String,
    connect_timeout: Duration,
    conn: Mutex<Option<Connection>>,
    pending: Arc<parking_lot::Mutex<Pending>>,
    next_request: AtomicU64,
    next_generation: AtomicU64,
}

impl WebSocketStore {
    /// Create a store for the given `ws://` or `wss://` URL. No connection
    /// is made until the first request.
    pub fn new(url: impl Into<String>) -> Self {
        WebSocketStore {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            conn: Mutex::new(None),
            pending: Arc::new(parking_lot::Mutex::new(Pending::default())),
            next_request: AtomicU64::new(1),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the connection now instead of on first use.
    pub async fn connect(&self) -> StoreResult<()> {
        let mut slot = self.conn.lock().await;
        self.ensure_connected(&mut slot).await.map(|_| ())
    }

    /// Close the connection if open. Outstanding requests fail.
    pub async fn disconnect(&self) {
        let mut slot = self.conn.lock().await;
        if let Some(mut conn) = slot.take() {
            let _ = conn.sink.close().await;
            self.pending
                .lock()
                .close(conn.generation, &StoreError::ConnectionClosed);
        }
    }

    /// Round-trip a ping. Used as a reachability probe.
    pub async fn ping(&self) -> StoreResult<()> {
        let id = self.next_id();
        match self.request(ClientMessage::ping(id)).await? {
            ServerMessage::Pong { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    /// Reuse the open connection, or open a new one if there is none or its
    /// reader has stopped.
    async fn ensure_connected<'a>(
        &self,
        slot: &'a mut Option<Connection>,
    ) -> StoreResult<&'a mut Connection> {
        if let Some(conn) = slot.as_ref() {
            if self.pending.lock().live != Some(conn.generation) {
                tracing::debug!("connection to {} lost, reconnecting", self.url);
                *slot = None;
            }
        }

        if slot.is_none() {
            let (ws, _) = tokio::time::timeout(
                self.connect_timeout,
                tokio_tungstenite::connect_async(self.url.as_str()),
            )
            .await
            .map_err(|_| StoreError::Timeout(self.connect_timeout))?
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            self.pending.lock().live = Some(generation);
            let (sink, stream) = ws.split();
            let reader = tokio::spawn(read_replies(stream, Arc::clone(&self.pending), generation));
            tracing::debug!("connected to {}", self.url);
            *slot = Some(Connection {
                sink,
                reader,
                generation,
            });
        }
        slot.as_mut().ok_or(StoreError::ConnectionClosed)
    }

    /// Send one request and wait for the reply carrying its id.
    async fn request(&self, msg: ClientMessage) -> StoreResult<ServerMessage> {
        let request_id = msg.request_id();
        let json = msg
            .to_json()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let (rx, _guard) = {
            let mut slot = self.conn.lock().await;
            let conn = self.ensure_connected(&mut slot).await?;
            let generation = conn.generation;
            let rx = self
                .pending
                .lock()
                .register(request_id, generation)
                .ok_or(StoreError::ConnectionClosed)?;
            let guard = WaitGuard {
                pending: &self.pending,
                request_id,
            };

            let sent = conn.sink.send(Message::Text(json.into())).await;
            if let Err(e) = sent {
                // Connection is broken, clear it
                let err = StoreError::ConnectionFailed(e.to_string());
                self.pending.lock().close(generation, &err);
                *slot = None;
                return Err(err);
            }
            (rx, guard)
        };

        match rx.await {
            Ok(Ok(ServerMessage::Error { message, .. })) => Err(StoreError::Rejected(message)),
            Ok(reply) => reply,
            Err(_) => Err(StoreError::ConnectionClosed),
        }
    }
}

/// Route replies to their waiters until the connection ends, then fail
/// whoever is left waiting on it.
async fn read_replies(
    mut stream: SplitStream<WsStream>,
    pending: Arc<parking_lot::Mutex<Pending>>,
    generation: u64,
) {
    let err = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let reply = match ServerMessage::from_json(&text) {
                    Ok(reply) => reply,
                    Err(e) => {
                        tracing::warn!("skipping unreadable reply: {}", e);
                        continue;
                    }
                };
                let Some(request_id) = reply.request_id() else {
                    tracing::warn!("skipping reply without request id: {:?}", reply);
                    continue;
                };
                let waiter = pending.lock().waiters.remove(&request_id);
                match waiter {
                    Some(waiter) => {
                        let _ = waiter.tx.send(Ok(reply));
                    }
                    None => tracing::debug!("skipping stale reply {}", request_id),
                }
            }
            Some(Ok(Message::Close(_))) | None => break StoreError::ConnectionClosed,
            Some(Ok(_)) => {
                // Ignore ping/pong and binary frames
                continue;
            }
            Some(Err(e)) => break StoreError::ConnectionFailed(e.to_string()),
        }
    };
    tracing::debug!("reader stopped: {}", err);
    pending.lock().close(generation, &err);
}

fn unexpected(reply: &ServerMessage) -> StoreError {
    StoreError::UnexpectedResponse(format!("{:?}", reply))
}

impl RemoteStore for WebSocketStore {
    fn add(&self, data: Payload) -> StoreFuture<'_, String> {
        Box::pin(async move {
            let request_id = self.next_id();
            match self.request(ClientMessage::add(request_id, data)).await? {
                ServerMessage::Added { id, .. } => Ok(id),
                other => Err(unexpected(&other)),
            }
        })
    }

    fn get_all(&self) -> StoreFuture<'_, Vec<RemoteRecord>> {
        Box::pin(async move {
            let request_id = self.next_id();
            match self.request(ClientMessage::get_all(request_id)).await? {
                ServerMessage::Records { records, .. } => Ok(records),
                other => Err(unexpected(&other)),
            }
        })
    }

    fn get(&self, id: &str) -> StoreFuture<'_, Option<RemoteRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let request_id = self.next_id();
            match self.request(ClientMessage::get(request_id, id)).await? {
                ServerMessage::Record { record, .. } => Ok(record),
                other => Err(unexpected(&other)),
            }
        })
    }

    fn delete(&self, id: &str) -> StoreFuture<'_, bool> {
        let id = id.to_string();
        Box::pin(async move {
            let request_id = self.next_id();
            match self.request(ClientMessage::delete(request_id, id)).await? {
                ServerMessage::Deleted { existed, .. } => Ok(existed),
                other => Err(unexpected(&other)),
            }
        })
    }

    fn query(&self, field: &str, op: QueryOp, value: Value) -> StoreFuture<'_, Vec<RemoteRecord>> {
        let field = field.to_string();
        Box::pin(async move {
            let request_id = self.next_id();
            match self
                .request(ClientMessage::query(request_id, field, op, value))
                .await?
            {
                ServerMessage::Records { records, .. } => Ok(records),
                other => Err(unexpected(&other)),
            }
        })
    }
}

#[cfg(test)]
#[path = "websocket_tests.rs"]
mod tests;
