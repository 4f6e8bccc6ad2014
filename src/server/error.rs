// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::RelayError;

/// Render an error as `{"detail": ...}` with the status matching its kind.
pub fn error_response(err: &RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    create_error(status, err.detail())
}

pub fn internal_error(message: impl Into<String>) -> Response {
    create_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub fn create_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}
