use thiserror::Error;

/// Application-wide error types for Vitrine.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body failed shape or field validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The addressed record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
