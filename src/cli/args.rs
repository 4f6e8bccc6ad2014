// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_CONFIG_FILE, DEFAULT_CONTEXT_LIMITS_FILE};

/// Web relay between a browser chat UI and a local Ollama server
#[derive(Parser, Debug)]
#[command(name = "ollama-relay")]
#[command(version, about = "Web relay between a browser chat UI and a local Ollama server")]
pub struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Application config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Context-limits table (JSON object of model name to token limit)
    #[arg(long, default_value = DEFAULT_CONTEXT_LIMITS_FILE)]
    pub context_limits: PathBuf,

    /// Directory holding index.html and other UI assets
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
