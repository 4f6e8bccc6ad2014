// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Ollama backend implementation
//!
//! Implements the ChatBackend trait over Ollama's `/api/tags` and
//! non-streaming `/api/chat` endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::common::{read_success_body, server_error, transport_error};
use crate::config::DEFAULT_OLLAMA_URL;
use crate::error::Result;
use crate::llm::backend::{
    BackendChatRequest, BackendChatResponse, BackendHealth, BackendModel, BackendStats,
    BackendTimeouts, ChatBackend, ChatMessage,
};

/// Ollama backend
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    timeouts: BackendTimeouts,
}

impl OllamaBackend {
    /// Create a new Ollama backend with the default base URL
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: BackendTimeouts::default(),
        }
    }

    /// Override the listing and health-probe timeouts
    pub fn with_timeouts(mut self, timeouts: BackendTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build the request body
    fn build_request<'a>(&self, request: &'a BackendChatRequest) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                // 0 is the UI's "unset"
                num_predict: request.max_tokens.filter(|n| *n != 0),
            },
        }
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_models(&self) -> Result<Vec<BackendModel>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeouts.list_models)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(server_error(status, body));
        }

        let body: OllamaTagsResponse = read_success_body(response).await?;
        Ok(body
            .models
            .into_iter()
            .map(|m| BackendModel::new(m.name, m.size))
            .collect())
    }

    async fn chat(
        &self,
        request: &BackendChatRequest,
        timeout: Duration,
    ) -> Result<BackendChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_request(request);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat request to Ollama"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Ollama API error: {} - {}", status, body);
            return Err(server_error(status, body));
        }

        let api_response: OllamaResponse = read_success_body(response).await?;
        Ok(api_response.into())
    }

    async fn health(&self) -> BackendHealth {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(self.timeouts.health)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => BackendHealth::Connected,
            Ok(response) => {
                tracing::debug!("Ollama health probe returned {}", response.status());
                BackendHealth::Error
            }
            Err(e) => {
                tracing::debug!("Ollama health probe failed: {}", e);
                BackendHealth::Disconnected
            }
        }
    }
}

impl From<OllamaResponse> for BackendChatResponse {
    fn from(response: OllamaResponse) -> Self {
        Self {
            content: response.message.content,
            stats: BackendStats {
                load_duration: response.load_duration,
                prompt_eval_count: response.prompt_eval_count.unwrap_or(0),
                prompt_eval_duration: response.prompt_eval_duration,
                eval_count: response.eval_count.unwrap_or(0),
                eval_duration: response.eval_duration,
                total_duration: response.total_duration,
            },
        }
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    message: OllamaResponseMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    load_duration: Option<u64>,
    #[serde(default)]
    prompt_eval_duration: Option<u64>,
    #[serde(default)]
    eval_duration: Option<u64>,
    #[serde(default)]
    total_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
    #[serde(default)]
    size: Option<u64>,
}
