use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use vitrine_core::error::AppError;
use vitrine_core::models::{ContactMessage, ContactStatus, NewContactMessage};

/// Repository for contact form submissions.
#[derive(Clone)]
pub struct ContactRepository {
    pool: Pool<Postgres>,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a submission with status `new`. Returns the generated UUID.
    pub async fn create(&self, message: &NewContactMessage) -> Result<Uuid, AppError> {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO contact_messages (name, email, contact_no, message, project_id, project_title, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.contact_no)
        .bind(&message.message)
        .bind(message.project_id)
        .bind(&message.project_title)
        .bind(ContactStatus::New.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.0)
    }

    /// All submissions, newest first, optionally limited to one status.
    pub async fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactMessage>, AppError> {
        let rows = if let Some(status) = status {
            sqlx::query_as::<_, ContactMessageRow>(
                r#"
                SELECT id, name, email, contact_no, message, project_id, project_title, status, created_at
                FROM contact_messages
                WHERE status = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, ContactMessageRow>(
                r#"
                SELECT id, name, email, contact_no, message, project_id, project_title, status, created_at
                FROM contact_messages
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Returns false when no message has the given id.
    pub async fn set_status(&self, id: Uuid, status: ContactStatus) -> Result<bool, AppError> {
        let result = sqlx::query(r#"UPDATE contact_messages SET status = $2 WHERE id = $1"#)
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(r#"DELETE FROM contact_messages WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    contact_no: String,
    message: String,
    project_id: Option<Uuid>,
    project_title: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<ContactMessageRow> for ContactMessage {
    fn from(row: ContactMessageRow) -> Self {
        ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            contact_no: row.contact_no,
            message: row.message,
            project_id: row.project_id,
            project_title: row.project_title,
            status: row.status.parse().unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}
