// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Tests for the public `run()` function.
//!
//! Commands that need a project directory are exercised through the binary
//! in tests/cli.rs. The ones here fail before touching the filesystem.

use super::*;
use tally_core::QueryOp;

#[test]
fn test_purge_without_confirmation_is_refused() {
    let result = run(Command::Purge {
        field: "test".to_string(),
        op: QueryOp::Eq,
        value: "true".to_string(),
        yes: false,
    });
    assert!(matches!(result, Err(Error::ConfirmationRequired(_))));
}

#[test]
fn test_command_add_construction() {
    let cmd = Command::Add {
        json: Some("{}".to_string()),
        fields: vec!["name=Ana".to_string()],
        output: OutputFormat::Json,
    };
    if let Command::Add {
        json,
        fields,
        output,
    } = cmd
    {
        assert_eq!(json.as_deref(), Some("{}"));
        assert_eq!(fields, vec!["name=Ana"]);
        assert_eq!(output, OutputFormat::Json);
    } else {
        panic!("Expected Add command");
    }
}
