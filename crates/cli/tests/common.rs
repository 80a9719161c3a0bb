// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn tally() -> Command {
    cargo_bin_cmd!("tally")
}

/// Helper to create an initialized temp directory in local-only mode
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    tally()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to add a record and return its id
pub fn add_record(temp: &TempDir, fields: &[&str]) -> String {
    let mut cmd = tally();
    cmd.arg("add");
    for field in fields {
        cmd.arg("-f").arg(field);
    }
    let output = cmd.current_dir(temp.path()).output().unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .find(|s| s.starts_with("local_"))
        .unwrap()
        .to_string()
}

/// Parse stdout of a successful command as JSON
pub fn json_output(temp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = tally().args(args).current_dir(temp.path()).output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}
