//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps each failure class to an
//! HTTP status and a JSON error body. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Malformed, missing, or contradictory input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                RepositoryError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
                RepositoryError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    // Don't expose internal error details to clients
                    tracing::error!(error = %err, "Request error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_owned(),
                    )
                }
            },
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {msg}")),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
