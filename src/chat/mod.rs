// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat turn handling
//!
//! Request/response bodies and the two-stage chat → summary pipeline.

pub mod orchestrator;
pub mod types;

pub use orchestrator::ChatOrchestrator;
pub use types::{ChatTurnRequest, ChatTurnResult, TurnUsage, DEFAULT_TEMPERATURE};
