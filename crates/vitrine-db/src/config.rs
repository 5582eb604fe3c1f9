use std::time::Duration;

use vitrine_core::AppError;
use vitrine_core::storage::{EnvSource, ProcessEnv};

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// How long a request waits for a pooled connection before failing.
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    /// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (optional, defaults to 30)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, AppError> {
        let url = env.get("DATABASE_URL").ok_or_else(|| {
            AppError::ConfigError("DATABASE_URL not set. Required for database operations.".into())
        })?;

        let max_connections = positive(env, "DATABASE_MAX_CONNECTIONS", 5)?;
        let acquire_timeout =
            Duration::from_secs(u64::from(positive(env, "DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?));

        Ok(Self {
            url,
            max_connections,
            acquire_timeout,
        })
    }
}

fn positive(env: &impl EnvSource, key: &str, default: u32) -> Result<u32, AppError> {
    let Some(raw) = env.get(key) else {
        return Ok(default);
    };
    let parsed: u32 = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {key} '{raw}': must be a positive integer"))
    })?;
    if parsed == 0 {
        return Err(AppError::ConfigError(format!("{key} must be at least 1")));
    }
    Ok(parsed)
}
