// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock backend for testing
//!
//! Provides a scripted implementation of the ChatBackend trait that can be
//! used in unit and integration tests without a running Ollama.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::llm::backend::{
    BackendChatRequest, BackendChatResponse, BackendHealth, BackendModel, BackendStats,
    ChatBackend,
};

type ChatOutcome = std::result::Result<BackendChatResponse, ApiError>;

/// A mock backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Result of `list_models`
    models: Arc<Mutex<std::result::Result<Vec<BackendModel>, ApiError>>>,
    /// Queued chat outcomes, consumed in order; the last one repeats
    chat_outcomes: Arc<Mutex<VecDeque<ChatOutcome>>>,
    /// Result of `health`
    health: Arc<Mutex<BackendHealth>>,
    /// Number of `list_models` calls
    list_calls: Arc<AtomicUsize>,
    /// Recorded chat requests with the timeout they were issued with
    recorded: Arc<Mutex<Vec<(BackendChatRequest, Duration)>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock backend lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockBackend {
    /// Create a mock with no models that answers every chat with "Mock response"
    pub fn new() -> Self {
        Self {
            models: Arc::new(Mutex::new(Ok(vec![]))),
            chat_outcomes: Arc::new(Mutex::new(VecDeque::new())),
            health: Arc::new(Mutex::new(BackendHealth::Connected)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            recorded: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Set the models reported by `list_models`
    pub fn with_models(self, names: &[&str]) -> Self {
        self.set_models(
            names
                .iter()
                .map(|name| BackendModel::new(*name, None))
                .collect(),
        );
        self
    }

    /// Replace the model listing
    pub fn set_models(&self, models: Vec<BackendModel>) {
        *lock(&self.models) = Ok(models);
    }

    /// Make `list_models` fail
    pub fn fail_listing(&self, err: ApiError) {
        *lock(&self.models) = Err(err);
    }

    /// Queue a successful chat reply
    pub fn with_reply(self, content: impl Into<String>, prompt_tokens: u64, eval_tokens: u64) -> Self {
        lock(&self.chat_outcomes).push_back(Ok(BackendChatResponse {
            content: content.into(),
            stats: BackendStats {
                prompt_eval_count: prompt_tokens,
                eval_count: eval_tokens,
                ..Default::default()
            },
        }));
        self
    }

    /// Queue a failed chat call
    pub fn with_failure(self, err: ApiError) -> Self {
        lock(&self.chat_outcomes).push_back(Err(err));
        self
    }

    /// Set the health probe result
    pub fn with_health(self, health: BackendHealth) -> Self {
        *lock(&self.health) = health;
        self
    }

    /// Number of chat calls made
    pub fn chat_count(&self) -> usize {
        lock(&self.recorded).len()
    }

    /// Number of model listings requested
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// All recorded chat requests
    pub fn recorded_requests(&self) -> Vec<BackendChatRequest> {
        lock(&self.recorded)
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// Timeouts the chat calls were issued with
    pub fn recorded_timeouts(&self) -> Vec<Duration> {
        lock(&self.recorded)
            .iter()
            .map(|(_, timeout)| *timeout)
            .collect()
    }

    fn next_outcome(&self) -> ChatOutcome {
        let mut outcomes = lock(&self.chat_outcomes);
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap_or_else(|| Ok(default_reply()))
        } else {
            outcomes.front().cloned().unwrap_or_else(|| Ok(default_reply()))
        }
    }
}

fn default_reply() -> BackendChatResponse {
    BackendChatResponse {
        content: "Mock response".to_string(),
        stats: BackendStats {
            prompt_eval_count: 10,
            eval_count: 20,
            ..Default::default()
        },
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn base_url(&self) -> &str {
        "mock://backend"
    }

    async fn list_models(&self) -> Result<Vec<BackendModel>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.models).clone().map_err(Into::into)
    }

    async fn chat(
        &self,
        request: &BackendChatRequest,
        timeout: Duration,
    ) -> Result<BackendChatResponse> {
        lock(&self.recorded).push((request.clone(), timeout));
        self.next_outcome().map_err(Into::into)
    }

    async fn health(&self) -> BackendHealth {
        *lock(&self.health)
    }
}
