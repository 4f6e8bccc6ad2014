// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for the relay
//!
//! Handles the application config file and the context-limits table.

pub mod app_config;
pub mod context_limits;

pub use app_config::*;
pub use context_limits::*;
