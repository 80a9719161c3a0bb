// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use tally_core::QueryOp;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Which local records `tally clear` removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClearTarget {
    /// Records already confirmed by the remote
    Synced,
    /// Every local record, pending ones included
    All,
    /// Records that exhausted their retries
    Failed,
}

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first vote registration with background sync")]
#[command(
    long_about = "Offline-first vote registration with background sync.\n\n\
    Records are queued locally and pushed to a tally-remote relay whenever it is reachable."
)]
pub struct Cli {
    /// Run as if tally was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a .tally directory
    #[command(after_help = "\
Examples:
  tally init                               Local-only (records never leave this machine)
  tally init --remote ws://relay:7890      Sync to a tally-remote relay")]
    Init {
        /// Relay URL (ws:// or wss://)
        #[arg(long)]
        remote: Option<String>,

        /// Directory to initialize (default: current directory)
        #[arg(long)]
        path: Option<String>,
    },

    /// Record a registration
    #[command(after_help = "\
Examples:
  tally add '{\"name\": \"Ana\", \"cedula\": \"123\"}'   Add from a JSON object
  tally add -f name=Ana -f mesa=3                Add from key=value fields
  tally add '{\"name\": \"Ana\"}' -f mesa=3        Fields override the JSON object")]
    Add {
        /// Payload as a JSON object
        json: Option<String>,

        /// Payload field as key=value (repeatable; value parsed as JSON when possible)
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Push pending records to the remote now
    Sync {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queue counts and sync history
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List local records
    List {
        /// Also fetch records from the remote
        #[arg(long)]
        remote: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Remove records from the local queue
    #[command(after_help = "\
Examples:
  tally clear synced --yes     Drop records the remote already has
  tally clear failed --yes     Drop records that gave up retrying
  tally clear all --yes        Drop everything, including unsynced records")]
    Clear {
        /// Which records to remove
        #[arg(value_enum)]
        target: ClearTarget,

        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },

    /// Retry records that exhausted their retries
    Retry,

    /// Find records sharing a field value on the remote
    #[command(after_help = "\
Examples:
  tally dedupe --field cedula            Report duplicate registrations
  tally dedupe --field cedula --apply    Keep the newest of each, delete the rest")]
    Dedupe {
        /// Payload field identifying a voter
        #[arg(long, value_parser = non_empty_string)]
        field: String,

        /// Delete the duplicates instead of reporting them
        #[arg(long)]
        apply: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Delete remote records matching a query
    #[command(after_help = "\
Examples:
  tally purge --field test --value true --yes             Remove test records
  tally purge --field timestamp --op '<' --value 0 --yes  Remove records with bad timestamps")]
    Purge {
        /// Payload field to compare
        #[arg(long, value_parser = non_empty_string)]
        field: String,

        /// Comparison operator (==, !=, <, <=, >, >=)
        #[arg(long, default_value = "==")]
        op: QueryOp,

        /// Value to compare against (parsed as JSON when possible)
        #[arg(long)]
        value: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Keep syncing in the foreground until interrupted
    Watch,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
