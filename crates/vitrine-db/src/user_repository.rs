use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use vitrine_core::error::AppError;
use vitrine_core::models::AdminUser;

/// Read-only access to administrator accounts. Accounts are provisioned outside this
/// service, and `password_hash` is never selected.
#[derive(Clone)]
pub struct AdminUserRepository {
    pool: Pool<Postgres>,
}

impl AdminUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<AdminUser>, AppError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT id, username, email, created_at, updated_at
            FROM admin_users
            ORDER BY created_at ASC, username ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        AdminUser {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
