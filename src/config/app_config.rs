// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Application configuration, loaded once from `app_config.json`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{RelayError, Result};

/// Base URL used when the config does not name one.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "app_config.json";

/// Process-wide application config.
///
/// Known keys holding strings are typed. Everything else, including known keys
/// that are `null` or of the wrong type, stays in `extra` so `GET /config`
/// serves the file document back as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct AppConfig {
    /// Ollama base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_base_url: Option<String>,

    /// Model moved to the top of the model list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Model used for the secondary summarization pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_model_name: Option<String>,

    /// Passthrough keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for AppConfig {
    fn from(mut document: Map<String, Value>) -> Self {
        Self {
            ollama_base_url: take_string(&mut document, "ollama_base_url"),
            default_model: take_string(&mut document, "default_model"),
            summary_model_name: take_string(&mut document, "summary_model_name"),
            extra: document,
        }
    }
}

/// Move `key` out of `document` if it holds a string.
fn take_string(document: &mut Map<String, Value>, key: &str) -> Option<String> {
    match document.get(key) {
        Some(Value::String(_)) => match document.remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        },
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::warn!(
                "Config key '{}' should be a string, got {}. Ignoring it.",
                key,
                other
            );
            None
        }
    }
}

impl AppConfig {
    /// Load config from a path, degrading to the default config.
    ///
    /// A missing or malformed file is logged and never fatal.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(Some(config)) => {
                tracing::info!("Loaded application config from {}", path.display());
                config
            }
            Ok(None) => {
                tracing::info!(
                    "Config file {} not found. Using default config.",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{}. Using default config.", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific path. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(|e| {
            RelayError::Config(format!("Error parsing {}: {}", path.display(), e))
        })?;
        Ok(Some(config))
    }

    /// Effective Ollama base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.ollama_base_url
            .as_deref()
            .unwrap_or(DEFAULT_OLLAMA_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Configured summary model, ignoring empty strings.
    pub fn summary_model(&self) -> Option<&str> {
        self.summary_model_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Configured default model, ignoring empty strings.
    pub fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref().filter(|name| !name.is_empty())
    }
}
