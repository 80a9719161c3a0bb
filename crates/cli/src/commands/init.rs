// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::config::init_work_dir;
use crate::error::Result;

pub fn run(remote: Option<String>, path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let work_dir = init_work_dir(&target_path, remote.clone())?;

    println!("Initialized tally at {}", work_dir.display());
    match remote {
        Some(url) => println!("Remote: {}", url),
        None => {
            println!("Mode: local-only");
            println!();
            println!("To sync records, add a [remote] section to .tally/config.toml:");
            println!();
            println!("  [remote]");
            println!("  url = \"ws://your-relay:7890\"");
        }
    }

    Ok(())
}
