// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::future::Future;
use std::sync::atomic::AtomicUsize;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;

use super::*;

type ServerWs = WebSocketStream<TcpStream>;

/// Serve every accepted connection with `serve` and return the URL.
async fn scripted<F, Fut>(serve: F) -> String
where
    F: Fn(ServerWs) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let ws = accept_async(stream).await.unwrap();
            tokio::spawn(serve(ws));
        }
    });
    format!("ws://{}", addr)
}

async fn next_request(ws: &mut ServerWs) -> Option<ClientMessage> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return Some(ClientMessage::from_json(&text).unwrap()),
            Some(Ok(_)) => continue,
            _ => return None,
        }
    }
}

async fn reply(ws: &mut ServerWs, msg: ServerMessage) {
    ws.send(Message::Text(msg.to_json().unwrap().into()))
        .await
        .unwrap();
}

fn doc() -> Payload {
    json!({"name": "Ana"}).as_object().unwrap().clone()
}

const PATIENCE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn ping_is_answered_while_an_add_is_outstanding() {
    // The add is acknowledged only after the ping has been answered
    let url = scripted(|mut ws| async move {
        let Some(ClientMessage::Add { request_id, .. }) = next_request(&mut ws).await else {
            panic!("expected add first");
        };
        let Some(ClientMessage::Ping { id }) = next_request(&mut ws).await else {
            panic!("expected ping second");
        };
        reply(&mut ws, ServerMessage::pong(id)).await;
        reply(&mut ws, ServerMessage::added(request_id, "R1")).await;
    })
    .await;
    let store = WebSocketStore::new(url);

    let (added, pinged) = timeout(PATIENCE, async { tokio::join!(store.add(doc()), store.ping()) })
        .await
        .expect("requests should not wait on each other");

    assert_eq!(added.unwrap(), "R1");
    pinged.unwrap();
    assert!(store.pending.lock().waiters.is_empty());
}

#[tokio::test]
async fn replies_are_routed_by_request_id() {
    // Answer two adds in reverse order
    let url = scripted(|mut ws| async move {
        let Some(ClientMessage::Add { request_id: first, .. }) = next_request(&mut ws).await else {
            panic!("expected add");
        };
        let Some(ClientMessage::Add { request_id: second, .. }) = next_request(&mut ws).await else {
            panic!("expected add");
        };
        reply(&mut ws, ServerMessage::added(second, "R2")).await;
        reply(&mut ws, ServerMessage::added(first, "R1")).await;
    })
    .await;
    let store = WebSocketStore::new(url);

    let (a, b) = timeout(PATIENCE, async { tokio::join!(store.add(doc()), store.add(doc())) })
        .await
        .unwrap();

    assert_eq!(a.unwrap(), "R1");
    assert_eq!(b.unwrap(), "R2");
}

#[tokio::test]
async fn abandoned_reply_is_skipped() {
    let url = scripted(|mut ws| async move {
        let Some(ClientMessage::Add { request_id, .. }) = next_request(&mut ws).await else {
            panic!("expected add");
        };
        let Some(ClientMessage::GetAll { request_id: fetch }) = next_request(&mut ws).await else {
            panic!("expected get_all");
        };
        reply(&mut ws, ServerMessage::added(request_id, "R1")).await;
        reply(&mut ws, ServerMessage::records(fetch, Vec::new())).await;
    })
    .await;
    let store = WebSocketStore::new(url);

    // Give up on the add before the server answers it
    let gave_up = timeout(Duration::from_millis(50), store.add(doc())).await;
    assert!(gave_up.is_err());
    assert!(store.pending.lock().waiters.is_empty());

    let records = timeout(PATIENCE, store.get_all()).await.unwrap().unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn server_close_fails_outstanding_request() {
    let url = scripted(|mut ws| async move {
        let _ = next_request(&mut ws).await;
        let _ = ws.close(None).await;
    })
    .await;
    let store = WebSocketStore::new(url);

    let result = timeout(PATIENCE, store.add(doc()))
        .await
        .expect("request should fail, not hang");

    assert!(matches!(
        result,
        Err(StoreError::ConnectionClosed | StoreError::ConnectionFailed(_))
    ));
}

#[tokio::test]
async fn reconnects_after_connection_loss() {
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    let url = scripted(move |mut ws| {
        let nth = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if nth == 0 {
                let _ = ws.close(None).await;
                return;
            }
            while let Some(msg) = next_request(&mut ws).await {
                if let ClientMessage::Ping { id } = msg {
                    reply(&mut ws, ServerMessage::pong(id)).await;
                }
            }
        }
    })
    .await;
    let store = WebSocketStore::new(url);

    store.connect().await.unwrap();
    // Wait for the first connection's reader to see the close
    timeout(PATIENCE, async {
        while store.pending.lock().live.is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    timeout(PATIENCE, store.ping()).await.unwrap().unwrap();
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_server_fails_to_connect() {
    let store = WebSocketStore::new("ws://127.0.0.1:9").with_connect_timeout(Duration::from_secs(1));

    let result = store.ping().await;

    assert!(matches!(
        result,
        Err(StoreError::ConnectionFailed(_) | StoreError::Timeout(_))
    ));
}
