//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Returns JSON error bodies with a machine-readable code and a message.
//!
//! Bundle routes answer every failure with 404. A failure inside the
//! cache is logged with its details and reported to the client as a plain
//! not-found, so nothing about the host filesystem leaks.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown identifier, unknown suffix, or unknown route (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The bundle could not be produced (404). Details are logged only.
    #[error("bundle unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) | Self::Unavailable(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Unavailable(_) => {
                tracing::error!(error = %self, "bundle could not be produced");
                "bundle not available".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ldb_bundle::CacheError> for AppError {
    fn from(err: ldb_bundle::CacheError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
