// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend module
//!
//! Provides the abstraction over the inference server and its Ollama
//! implementation.

pub mod backend;
pub mod mock_backend;
pub mod providers;

pub use backend::*;
