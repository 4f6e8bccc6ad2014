// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model registry system
//!
//! Tracks which models the backend serves and their context limits.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ollama_relay::models::ModelRegistry;
//!
//! let registry = ModelRegistry::new(backend, ContextLimits::new("ollama_context.cfg"));
//! registry.refresh().await;
//!
//! // Default model first, the rest by name
//! let models = registry.list_sorted(Some("llama3:latest")).await;
//! ```

pub mod registry;

pub use registry::{sort_models, ModelDescriptor, ModelRegistry, RegistryState};
