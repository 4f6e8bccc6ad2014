// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Static table of per-model context-window limits (`ollama_context.cfg`)
//!
//! The file is a JSON object mapping exact model names to token limits. It is
//! re-read on every registry refresh so an operator can regenerate it without
//! restarting the relay.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Default limits file name, relative to the working directory.
pub const DEFAULT_CONTEXT_LIMITS_FILE: &str = "ollama_context.cfg";

/// Context limit used for models missing from the table.
pub const DEFAULT_CONTEXT_LIMIT: u64 = 4096;

/// Reader for the context-limits file that remembers the last good table.
#[derive(Debug)]
pub struct ContextLimits {
    path: PathBuf,
    last_good: Mutex<HashMap<String, u64>>,
}

impl ContextLimits {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_good: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the limits table.
    ///
    /// A missing file means "no overrides". An unreadable or malformed file keeps
    /// the last table that parsed, so a half-written regeneration does not wipe
    /// known limits. The file is read before the table lock is taken.
    pub async fn load(&self) -> HashMap<String, u64> {
        let read = read_limits(&self.path).await;
        let mut last_good = self.lock_last_good();

        match read {
            Ok(Some(limits)) => {
                tracing::debug!(
                    "Loaded {} context limits from {}",
                    limits.len(),
                    self.path.display()
                );
                *last_good = limits.clone();
                limits
            }
            Ok(None) => {
                tracing::info!(
                    "Context limits file {} not found. All models default to {} tokens.",
                    self.path.display(),
                    DEFAULT_CONTEXT_LIMIT
                );
                last_good.clear();
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Error reading {}: {}. Keeping {} previously loaded limits.",
                    self.path.display(),
                    e,
                    last_good.len()
                );
                last_good.clone()
            }
        }
    }

    fn lock_last_good(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        match self.last_good.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Context limits lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_limits(path: &Path) -> crate::error::Result<Option<HashMap<String, u64>>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Context limit for `name`, falling back to [`DEFAULT_CONTEXT_LIMIT`].
pub fn limit_for(limits: &HashMap<String, u64>, name: &str) -> u64 {
    limits.get(name).copied().unwrap_or(DEFAULT_CONTEXT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let limits = ContextLimits::new(temp.path().join("ollama_context.cfg"));
        assert!(limits.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_valid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ollama_context.cfg");
        std::fs::write(&path, r#"{"llama3:latest": 8192, "phi3": 131072}"#).unwrap();

        let table = ContextLimits::new(&path).load().await;
        assert_eq!(table.len(), 2);
        assert_eq!(limit_for(&table, "llama3:latest"), 8192);
        assert_eq!(limit_for(&table, "phi3"), 131072);
        assert_eq!(limit_for(&table, "llama3"), DEFAULT_CONTEXT_LIMIT);
    }

    #[tokio::test]
    async fn test_corrupt_file_keeps_last_good() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ollama_context.cfg");
        std::fs::write(&path, r#"{"llama3": 8192}"#).unwrap();

        let limits = ContextLimits::new(&path);
        assert_eq!(limits.load().await["llama3"], 8192);

        std::fs::write(&path, "{ truncated").unwrap();
        assert_eq!(limits.load().await["llama3"], 8192);
    }

    #[tokio::test]
    async fn test_corrupt_file_without_history_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ollama_context.cfg");
        std::fs::write(&path, r#"["not", "an", "object"]"#).unwrap();

        assert!(ContextLimits::new(&path).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_file_drops_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ollama_context.cfg");
        std::fs::write(&path, r#"{"llama3": 8192}"#).unwrap();

        let limits = ContextLimits::new(&path);
        assert_eq!(limits.load().await.len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert!(limits.load().await.is_empty());

        // Corruption after deletion has nothing to fall back to
        std::fs::write(&path, "garbage").unwrap();
        assert!(limits.load().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_agree() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ollama_context.cfg");
        std::fs::write(&path, r#"{"llama3": 8192}"#).unwrap();

        let limits = std::sync::Arc::new(ContextLimits::new(&path));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let limits = std::sync::Arc::clone(&limits);
                tokio::spawn(async move { limits.load().await })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap()["llama3"], 8192);
        }
    }
}
