use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use vitrine_core::error::AppError;

use crate::dto::ErrorResponse;

/// Handler-boundary error. Client errors carry their message to the caller; server errors
/// carry a fixed user-facing message and keep the underlying cause for the log only.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete body (400).
    Validation(String),
    /// Addressed record does not exist (404).
    NotFound(String),
    /// Route exists but is disabled by policy (405).
    PolicyDenied(String),
    /// Persistence or other unexpected failure (500).
    Internal { message: String, source: AppError },
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => ApiError::Validation(msg),
            AppError::NotFound(msg) => ApiError::NotFound(msg),
            source => ApiError::Internal {
                message: "Internal server error".to_string(),
                source,
            },
        }
    }
}

/// Attach the fixed user-facing message used when an operation fails server-side.
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, message: impl Into<String>) -> Result<T, ApiError> {
        self.map_err(|err| match err {
            AppError::Validation(msg) => ApiError::Validation(msg),
            AppError::NotFound(msg) => ApiError::NotFound(msg),
            source => ApiError::Internal {
                message: message.into(),
                source,
            },
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PolicyDenied(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg),
            ApiError::Internal { message, source } => {
                tracing::error!(error = %source, "{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, axum::Json(ErrorResponse::new(message))).into_response()
    }
}
