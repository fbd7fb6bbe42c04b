// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad credentials or unreachable login endpoint.
    #[error("Drivvo authentication failed")]
    AuthenticationFailed,

    /// A Drivvo endpoint answered non-2xx or could not be reached.
    #[error("Drivvo request failed: {0}")]
    FetchFailed(String),

    /// A Drivvo endpoint answered with an unexpected body.
    #[error("Malformed Drivvo response: {0}")]
    MalformedResponse(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error should abort integration setup.
    pub fn is_fatal_at_setup(&self) -> bool {
        matches!(self, AppError::AuthenticationFailed)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::AuthenticationFailed => {
                (StatusCode::BAD_GATEWAY, "authentication_failed", None)
            }
            AppError::FetchFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "drivvo_error", Some(msg.clone()))
            }
            AppError::MalformedResponse(msg) => (
                StatusCode::BAD_GATEWAY,
                "malformed_response",
                Some(msg.clone()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
