// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Request and response bodies for one chat turn

use serde::{Deserialize, Deserializer, Serialize};

use crate::llm::backend::{BackendStats, ChatMessage};

/// Sampling temperature used when the caller does not send one
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(
        default = "default_temperature",
        deserialize_with = "temperature_or_default"
    )]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: Option<i64>,
}

impl ChatTurnRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

/// Explicit `null` means "use the default", same as a missing key.
fn temperature_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_TEMPERATURE))
}

/// Token usage reported to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnUsage {
    pub total_tokens: u64,
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurnResult {
    /// Generated text of the primary model
    pub content: String,
    pub usage: TurnUsage,
    /// Always 0 for a local backend; kept for clients of metered backends
    pub estimated_cost: Option<f64>,
    /// Backend counters, passed through
    pub ollama_stats: Option<BackendStats>,
    /// Summary text, or a description of why summarizing failed
    pub summary: Option<String>,
}
