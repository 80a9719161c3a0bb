// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Event {
    id: u32,
    name: String,
}

fn event(id: u32, name: &str) -> Event {
    Event {
        id,
        name: name.into(),
    }
}

#[test]
fn append_creates_file_if_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("votes.jsonl");

    append(&path, &event(1, "first")).unwrap();

    assert!(path.exists());
}

#[test]
fn replay_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.jsonl");

    let replayed: Replay<Event> = replay(&path).unwrap();
    assert!(replayed.events.is_empty());
    assert!(!replayed.torn_tail);
}

#[test]
fn append_then_replay_keeps_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("votes.jsonl");

    append(&path, &event(1, "first")).unwrap();
    append(&path, &event(2, "second")).unwrap();

    let replayed: Replay<Event> = replay(&path).unwrap();
    assert_eq!(replayed.events, vec![event(1, "first"), event(2, "second")]);
}

#[test]
fn replay_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("votes.jsonl");
    std::fs::write(
        &path,
        "{\"id\":1,\"name\":\"a\"}\n\n   \n{\"id\":2,\"name\":\"b\"}\n",
    )
    .unwrap();

    let replayed: Replay<Event> = replay(&path).unwrap();
    assert_eq!(replayed.events.len(), 2);
}

#[test]
fn replay_drops_torn_final_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("votes.jsonl");
    std::fs::write(&path, "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"na").unwrap();

    let replayed: Replay<Event> = replay(&path).unwrap();
    assert_eq!(replayed.events, vec![event(1, "a")]);
    assert!(replayed.torn_tail);
}

#[test]
fn replay_rejects_corruption_in_the_middle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("votes.jsonl");
    std::fs::write(
        &path,
        "{\"id\":1,\"name\":\"a\"}\ngarbage\n{\"id\":2,\"name\":\"b\"}\n",
    )
    .unwrap();

    let result: Result<Replay<Event>> = replay(&path);
    assert!(matches!(result, Err(Error::CorruptedData(_))));
}

#[test]
fn rewrite_replaces_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("votes.jsonl");

    append(&path, &event(1, "first")).unwrap();
    rewrite(&path, &[event(2, "compacted")]).unwrap();

    let replayed: Replay<Event> = replay(&path).unwrap();
    assert_eq!(replayed.events, vec![event(2, "compacted")]);
    assert!(!dir.path().join("votes.jsonl.tmp").exists());
}
