// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, RelayError, Result};

/// Construct a standardized server error.
pub(crate) fn server_error(status: u16, message: impl Into<String>) -> RelayError {
    RelayError::Api(ApiError::ServerError {
        status,
        message: message.into(),
    })
}

/// Map a failed `send()` onto the connectivity taxonomy.
pub(crate) fn transport_error(err: &reqwest::Error) -> RelayError {
    RelayError::Api(ApiError::from_transport(err))
}

/// Read and decode a success body.
///
/// Body read failures (including timeouts mid-body) stay connectivity errors;
/// undecodable JSON becomes `InvalidResponse`.
pub(crate) async fn read_success_body<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let text = response.text().await.map_err(|e| transport_error(&e))?;
    serde_json::from_str(&text)
        .map_err(|e| RelayError::Api(ApiError::InvalidResponse(e.to_string())))
}
