// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat turn orchestration
//!
//! One turn is a primary chat call followed, when a summary model is
//! configured and known to the registry, by a second call that summarizes the
//! primary answer. The two calls are sequential. A failed primary call fails
//! the turn; a failed summary call is reported inside `summary` and never
//! touches the primary result.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{ApiError, RelayError, Result};
use crate::llm::backend::{BackendChatRequest, BackendTimeouts, ChatBackend, ChatMessage};
use crate::models::ModelRegistry;

use super::types::{ChatTurnRequest, ChatTurnResult, TurnUsage};

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a concise summarization assistant. Summarize the following text briefly and accurately.";
const SUMMARY_TEMPERATURE: f64 = 0.3;
const SUMMARY_MAX_TOKENS: i64 = 150;

/// Executes chat turns against the backend
pub struct ChatOrchestrator {
    backend: Arc<dyn ChatBackend>,
    registry: Arc<ModelRegistry>,
    config: Arc<AppConfig>,
    timeouts: BackendTimeouts,
}

impl ChatOrchestrator {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        registry: Arc<ModelRegistry>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            backend,
            registry,
            config,
            timeouts: BackendTimeouts::default(),
        }
    }

    /// Override the chat and summary timeouts
    pub fn with_timeouts(mut self, timeouts: BackendTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run one chat turn: primary completion plus optional summary.
    pub async fn handle_chat(&self, request: ChatTurnRequest) -> Result<ChatTurnResult> {
        let mut result = self.generate(request).await?;

        if let Some(summary_model) = self.config.summary_model() {
            if self.registry.contains(summary_model).await {
                result.summary = Some(self.summarize(&result.content, summary_model).await);
            } else {
                tracing::info!(
                    "Configured summary model '{}' not found on {}. Skipping summarization.",
                    summary_model,
                    self.backend.name()
                );
            }
        }

        Ok(result)
    }

    /// Primary completion, without the summary stage.
    pub async fn generate(&self, request: ChatTurnRequest) -> Result<ChatTurnResult> {
        let model = request.model.clone();
        tracing::info!(
            "Sending request to model '{}' with {} messages",
            model,
            request.messages.len()
        );

        let backend_request = BackendChatRequest {
            model: request.model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let response = self
            .backend
            .chat(&backend_request, self.timeouts.chat)
            .await?;

        let total_tokens = response.stats.total_tokens();
        tracing::info!("Received response from '{}'. Tokens: {}", model, total_tokens);

        Ok(ChatTurnResult {
            content: response.content,
            usage: TurnUsage { total_tokens },
            estimated_cost: Some(0.0),
            ollama_stats: Some(response.stats),
            summary: None,
        })
    }

    /// Summarize `text` with `model`. Failures come back as a descriptive string.
    pub async fn summarize(&self, text: &str, model: &str) -> String {
        tracing::debug!("Summarizing {} chars with model '{}'", text.len(), model);

        let request = summary_request(text, model);
        match self.backend.chat(&request, self.timeouts.summary).await {
            Ok(response) => {
                let summary = response.content.trim().to_string();
                tracing::debug!(
                    "Summary generated by {}: {}...",
                    model,
                    summary.chars().take(50).collect::<String>()
                );
                summary
            }
            Err(e) => {
                tracing::warn!("Summarization with '{}' failed: {}", model, e);
                summary_failure(&e)
            }
        }
    }
}

/// Fixed two-message summarization prompt
fn summary_request(text: &str, model: &str) -> BackendChatRequest {
    BackendChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(format!("Summarize:\n\n{}", text)),
        ],
        temperature: SUMMARY_TEMPERATURE,
        max_tokens: Some(SUMMARY_MAX_TOKENS),
    }
}

fn summary_failure(err: &RelayError) -> String {
    match err {
        RelayError::Api(ApiError::ServerError { status, message }) => {
            format!("Error summarizing: {} - {}", status, message)
        }
        RelayError::Api(api) if api.is_connectivity() => {
            format!("Error summarizing: connection issue - {}", api)
        }
        other => format!("Error summarizing: unexpected error - {}", other),
    }
}
