// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend trait and related types
//!
//! Defines the abstraction over the inference server: model listing, a
//! single non-streaming chat completion, and a reachability probe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Main trait for inference backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name (e.g., "ollama")
    fn name(&self) -> &str;

    /// Base URL the backend is reached at
    fn base_url(&self) -> &str;

    /// List the models the backend currently serves
    async fn list_models(&self) -> Result<Vec<BackendModel>>;

    /// Non-streaming chat completion, bounded by `timeout`
    async fn chat(&self, request: &BackendChatRequest, timeout: Duration)
        -> Result<BackendChatResponse>;

    /// Probe reachability. Never fails.
    async fn health(&self) -> BackendHealth;
}

/// One chat message, passed to the backend verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Request for a chat completion
#[derive(Debug, Clone, PartialEq)]
pub struct BackendChatRequest {
    /// Model to use
    pub model: String,

    /// Messages in the conversation
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    pub temperature: f64,

    /// Cap on generated tokens. Negative values are backend sentinels
    /// (Ollama: -1 unlimited, -2 fill the context).
    pub max_tokens: Option<i64>,
}

/// Completion returned by the backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendChatResponse {
    /// Generated text
    pub content: String,

    /// Backend-reported counters
    pub stats: BackendStats,
}

/// Timing and token counters reported by the backend, passed through untouched.
///
/// Durations are in the backend's native unit (nanoseconds for Ollama).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendStats {
    pub load_duration: Option<u64>,
    #[serde(default)]
    pub prompt_eval_count: u64,
    pub prompt_eval_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: u64,
    pub eval_duration: Option<u64>,
    pub total_duration: Option<u64>,
}

impl BackendStats {
    /// Prompt plus completion tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_eval_count.saturating_add(self.eval_count)
    }
}

/// A model as reported by the backend listing
#[derive(Debug, Clone, PartialEq)]
pub struct BackendModel {
    pub name: String,
    pub size: Option<u64>,
}

impl BackendModel {
    pub fn new(name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Outcome of a reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendHealth {
    /// Backend answered the probe with a success status
    Connected,
    /// Backend answered with a non-success status
    Error,
    /// Backend could not be reached
    Disconnected,
}

impl BackendHealth {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendHealth::Connected => "connected",
            BackendHealth::Error => "error",
            BackendHealth::Disconnected => "disconnected",
        }
    }
}

/// Bounded waits for each kind of backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub chat: Duration,
    pub summary: Duration,
    pub health: Duration,
    pub list_models: Duration,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self {
            chat: Duration::from_secs(300),
            summary: Duration::from_secs(60),
            health: Duration::from_secs(5),
            list_models: Duration::from_secs(10),
        }
    }
}
