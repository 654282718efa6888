//! Error handling for the HTTP service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::hub::RegistryFull;

/// Message returned to callers for any store failure. The underlying error
/// text never reaches the client; it is logged server-side instead.
pub const DB_ERROR_MESSAGE: &str = "Database error. Please try again later.";

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store query failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Active stream limit reached.
    #[error("stream capacity reached")]
    StreamCapacity,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Client-facing error message.
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(err) => {
                tracing::error!(error = ?err, "store query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, DB_ERROR_MESSAGE)
            }
            AppError::StreamCapacity => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Too many active streams. Please try again later.",
            ),
        };

        let body = ErrorResponse {
            error: message.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryFull> for AppError {
    fn from(_: RegistryFull) -> Self {
        AppError::StreamCapacity
    }
}
