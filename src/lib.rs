// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! ollama-relay - web relay between a browser chat UI and a local Ollama server.
//!
//! This crate exposes the runtime used by the `ollama-relay` binary
//! (`src/main.rs`).
//!
//! Architecture highlights:
//! - `models`: registry of backend models enriched with context limits
//! - `chat`: two-stage chat turn (primary completion, optional summary)
//! - `llm`: backend abstraction and the Ollama implementation
//! - `config`: application config and context-limits table
//! - `server`: axum routes over the services above

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod server;

pub use error::{RelayError, Result};
