use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use vitrine_core::{AppError, ResourceSpec};

use crate::config::DatabaseConfig;
use crate::contact_repository::ContactRepository;
use crate::content_repository::ContentRepository;
use crate::image_repository::ImageRepository;
use crate::user_repository::AdminUserRepository;

/// Central database facade. Owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get a [`ContentRepository`] for one display resource.
    pub fn content_repo(&self, spec: &'static ResourceSpec) -> ContentRepository {
        ContentRepository::new(self.pool.clone(), spec)
    }

    pub fn contact_repo(&self) -> ContactRepository {
        ContactRepository::new(self.pool.clone())
    }

    pub fn user_repo(&self) -> AdminUserRepository {
        AdminUserRepository::new(self.pool.clone())
    }

    pub fn image_repo(&self) -> ImageRepository {
        ImageRepository::new(self.pool.clone())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
