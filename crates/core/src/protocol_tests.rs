// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

fn vote_data() -> Payload {
    let mut data = Payload::new();
    data.insert("name".into(), json!("Ana"));
    data.insert("cedula".into(), json!("12345678"));
    data
}

#[parameterized(
    add = { ClientMessage::add(1, vote_data()) },
    get_all = { ClientMessage::get_all(2) },
    get = { ClientMessage::get(3, "R1") },
    delete = { ClientMessage::delete(4, "R1") },
    query = { ClientMessage::query(5, "registeredBy", QueryOp::Eq, json!("test")) },
    ping = { ClientMessage::ping(12345) },
)]
fn client_message_roundtrip(msg: ClientMessage) {
    let json = msg.to_json().unwrap();
    let parsed = ClientMessage::from_json(&json).unwrap();
    assert_eq!(msg, parsed);
}

#[parameterized(
    added = { ServerMessage::added(1, "R1") },
    records = { ServerMessage::records(2, vec![RemoteRecord::new("R1", vote_data())]) },
    record_missing = { ServerMessage::record(3, None) },
    deleted = { ServerMessage::deleted(4, true) },
    pong = { ServerMessage::pong(9) },
    error = { ServerMessage::error(Some(5), "boom") },
)]
fn server_message_roundtrip(msg: ServerMessage) {
    let json = msg.to_json().unwrap();
    let parsed = ServerMessage::from_json(&json).unwrap();
    assert_eq!(msg, parsed);
}

#[test]
fn client_message_tagged_snake_case() {
    let json = ClientMessage::get_all(7).to_json().unwrap();
    assert_eq!(json, r#"{"type":"get_all","request_id":7}"#);
}

#[test]
fn query_op_on_wire_is_symbol() {
    let json = ClientMessage::query(1, "timestamp", QueryOp::Lt, json!(5))
        .to_json()
        .unwrap();
    assert!(json.contains(r#""op":"<""#));
}

#[test]
fn error_without_request_id_omits_field() {
    let json = ServerMessage::error(None, "bad json").to_json().unwrap();
    assert!(!json.contains("request_id"));
    let parsed = ServerMessage::from_json(&json).unwrap();
    assert_eq!(parsed.request_id(), None);
}

#[parameterized(
    add = { ClientMessage::add(11, Payload::new()), 11 },
    delete = { ClientMessage::delete(12, "x"), 12 },
    ping = { ClientMessage::ping(13), 13 },
)]
fn client_request_id(msg: ClientMessage, expected: u64) {
    assert_eq!(msg.request_id(), expected);
}

#[test]
fn server_request_id_matches_reply() {
    assert_eq!(ServerMessage::added(8, "R").request_id(), Some(8));
    assert_eq!(ServerMessage::deleted(9, false).request_id(), Some(9));
}

#[test]
fn unknown_type_fails_to_parse() {
    assert!(ClientMessage::from_json(r#"{"type":"explode"}"#).is_err());
}
