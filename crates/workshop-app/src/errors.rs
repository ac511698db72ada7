//! Workshop app error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. The body
//! is always `{"error": "<message>"}`, the shape workshop clients and alert
//! examples expect.

use crate::models::timestamp;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Workshop app error type.
///
/// Maps to HTTP status codes:
/// - MissingCredentials: 400 Bad Request
/// - InvalidCredentials: 401 Unauthorized
/// - SimulatedFailure, Broken: 500 Internal Server Error (injected on purpose)
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Username and password required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// `/may-fail` rolled a failure.
    #[error("Simulated failure")]
    SimulatedFailure,

    /// `/sometimes-broken` rolled a failure.
    #[error("Oops! Something went wrong here. Try again.")]
    Broken,
}

impl AppError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredentials => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::SimulatedFailure | AppError::Broken => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let timestamp = match self {
            AppError::SimulatedFailure => Some(timestamp()),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            timestamp,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
