// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model registry
//!
//! Catalog of the models the backend currently serves, each enriched with a
//! context limit from the static limits table. A refresh builds a complete new
//! [`RegistryState`] and swaps it in behind a single write lock, so readers see
//! either the old catalog or the new one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{limit_for, ContextLimits};
use crate::llm::backend::ChatBackend;

/// A model the backend reported, with its context window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Exact backend model name (unique key)
    pub name: String,
    /// Size on disk in bytes, when reported
    pub size: Option<u64>,
    /// Maximum context window in tokens
    pub context_limit: u64,
}

/// Snapshot of the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryState {
    pub models: HashMap<String, ModelDescriptor>,
    /// True only after a successful listing
    pub loaded: bool,
}

impl RegistryState {
    fn unloaded() -> Self {
        Self::default()
    }
}

/// Registry of backend models
pub struct ModelRegistry {
    backend: Arc<dyn ChatBackend>,
    limits: ContextLimits,
    state: RwLock<Arc<RegistryState>>,
}

impl ModelRegistry {
    pub fn new(backend: Arc<dyn ChatBackend>, limits: ContextLimits) -> Self {
        Self {
            backend,
            limits,
            state: RwLock::new(Arc::new(RegistryState::unloaded())),
        }
    }

    /// Reload context limits from the limits file.
    pub async fn load_context_limits(&self) -> HashMap<String, u64> {
        self.limits.load().await
    }

    /// Re-fetch the model listing and replace the catalog.
    ///
    /// Failures are logged and leave an empty, unloaded catalog. They are never
    /// returned to the caller.
    pub async fn refresh(&self) -> Arc<RegistryState> {
        let limits = self.load_context_limits().await;

        let next = match self.backend.list_models().await {
            Ok(models) => {
                tracing::info!("Found {} models on {}", models.len(), self.backend.name());
                let models = models
                    .into_iter()
                    .map(|model| {
                        let descriptor = ModelDescriptor {
                            context_limit: limit_for(&limits, &model.name),
                            name: model.name,
                            size: model.size,
                        };
                        (descriptor.name.clone(), descriptor)
                    })
                    .collect();
                RegistryState {
                    models,
                    loaded: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to refresh models from {}: {}", self.backend.base_url(), e);
                RegistryState::unloaded()
            }
        };

        let next = Arc::new(next);
        *self.state.write().await = Arc::clone(&next);
        next
    }

    /// Refresh only if no listing has succeeded yet.
    pub async fn ensure_loaded(&self) -> Arc<RegistryState> {
        let current = self.snapshot().await;
        if current.loaded {
            return current;
        }
        self.refresh().await
    }

    /// Current catalog snapshot
    pub async fn snapshot(&self) -> Arc<RegistryState> {
        Arc::clone(&*self.state.read().await)
    }

    /// All models sorted by name, with `default_model` (if present) first.
    pub async fn list_sorted(&self, default_model: Option<&str>) -> Vec<ModelDescriptor> {
        sort_models(self.snapshot().await.models.values().cloned().collect(), default_model)
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.snapshot().await.models.contains_key(name)
    }

    pub async fn get(&self, name: &str) -> Option<ModelDescriptor> {
        self.snapshot().await.models.get(name).cloned()
    }

    pub async fn is_loaded(&self) -> bool {
        self.snapshot().await.loaded
    }

    /// Number of known models
    pub async fn len(&self) -> usize {
        self.snapshot().await.models.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Sort ascending by name and move `default_model` to the front when present.
pub fn sort_models(
    mut models: Vec<ModelDescriptor>,
    default_model: Option<&str>,
) -> Vec<ModelDescriptor> {
    models.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(default) = default_model {
        if let Some(pos) = models.iter().position(|m| m.name == default) {
            let model = models.remove(pos);
            models.insert(0, model);
        }
    }

    models
}
