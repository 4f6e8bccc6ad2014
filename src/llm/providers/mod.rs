// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend implementations

mod common;
pub mod ollama;

pub use ollama::OllamaBackend;
