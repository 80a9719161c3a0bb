// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::collections::HashSet;
use yare::parameterized;

#[test]
fn local_id_has_time_prefix() {
    let id = generate_local_id(1_700_000_000_123);
    assert!(id.starts_with("local_1700000000123_"));
    assert!(is_local_id(&id));
}

#[test]
fn local_id_suffix_is_hex() {
    let id = generate_local_id(5);
    let suffix = id.rsplit('_').next().unwrap();
    assert_eq!(suffix.len(), 32);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn local_ids_unique_within_same_millisecond() {
    let ids: HashSet<String> = (0..10_000).map(|_| generate_local_id(1000)).collect();
    assert_eq!(ids.len(), 10_000);
}

#[parameterized(
    local = { "local_1_abc", true },
    remote = { "9f0c2d", false },
    empty = { "", false },
    prefix_inside = { "x_local_1", false },
)]
fn detects_local_ids(id: &str, expected: bool) {
    assert_eq!(is_local_id(id), expected);
}

#[test]
fn remote_ids_are_never_local() {
    let id = generate_remote_id();
    assert!(!is_local_id(&id));
    assert_eq!(id.len(), 32);
}

#[test]
fn now_ms_is_after_2024() {
    assert!(now_ms() > 1_704_067_200_000);
}
