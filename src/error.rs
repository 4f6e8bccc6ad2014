// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for the relay
//!
//! Backend failures are split from everything else so the HTTP layer can
//! answer with the status that matches the failure kind.

use thiserror::Error;

/// Main error type for relay operations
#[derive(Error, Debug)]
pub enum RelayError {
    /// Backend (Ollama) errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors not classified as connectivity failures
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything else that went wrong while handling a request
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Backend-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Backend could not be reached (connection refused, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Success status but the body could not be decoded
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a transport-level reqwest failure.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// True for failures where the backend never produced a response.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }
}

impl RelayError {
    /// HTTP status code a caller should see for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Api(ApiError::ServerError { status, .. }) => *status,
            RelayError::Api(ApiError::Network(_)) => 502,
            RelayError::Api(ApiError::Timeout) => 504,
            _ => 500,
        }
    }

    /// Message rendered into the error body returned to the caller.
    pub fn detail(&self) -> String {
        match self {
            RelayError::Api(ApiError::ServerError { message, .. }) => {
                format!("Ollama API Error: {}", message)
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
