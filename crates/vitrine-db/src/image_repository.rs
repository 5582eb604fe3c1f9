use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use vitrine_core::error::AppError;
use vitrine_core::models::{Image, ImageContent, ImageSource, NewImage};

/// Repository for image and video assets, stored inline or referenced by URL.
#[derive(Clone)]
pub struct ImageRepository {
    pool: Pool<Postgres>,
}

impl ImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one asset. `declared_size` is used for URL-referenced assets, whose bytes
    /// this service never sees.
    pub async fn create(&self, image: NewImage, declared_size: Option<i64>) -> Result<Uuid, AppError> {
        let size = image.inline_size().or(declared_size).unwrap_or(0);
        let (data, url) = match image.source {
            ImageSource::Inline(bytes) => (Some(bytes), None),
            ImageSource::Url(url) => (None, Some(url)),
        };

        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO images (filename, mime_type, size, data, url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&image.filename)
        .bind(&image.mime_type)
        .bind(size)
        .bind(data)
        .bind(url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.0)
    }

    /// Metadata of every asset, newest first. Inline bytes are not loaded.
    pub async fn list(&self) -> Result<Vec<Image>, AppError> {
        let rows = sqlx::query_as::<_, ImageRow>(
            r#"
            SELECT id, filename, mime_type, size, url, is_chunked, chunk_count, created_at
            FROM images
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Load what is needed to serve an asset.
    pub async fn content(&self, id: Uuid) -> Result<Option<ImageContent>, AppError> {
        let row: Option<(String, Option<Vec<u8>>, Option<String>)> =
            sqlx::query_as(r#"SELECT mime_type, data, url FROM images WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let Some((mime_type, data, url)) = row else {
            return Ok(None);
        };

        let source = match (data, url) {
            (Some(bytes), _) => ImageSource::Inline(bytes),
            (None, Some(url)) => ImageSource::Url(url),
            (None, None) => {
                return Err(AppError::DatabaseError(format!(
                    "image {id} has neither data nor url"
                )));
            }
        };

        Ok(Some(ImageContent { mime_type, source }))
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(r#"DELETE FROM images WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    filename: String,
    mime_type: String,
    size: i64,
    url: Option<String>,
    is_chunked: bool,
    chunk_count: i32,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Image {
            id: row.id,
            filename: row.filename,
            mime_type: row.mime_type,
            size: row.size,
            url: row.url,
            is_chunked: row.is_chunked,
            chunk_count: row.chunk_count,
            created_at: row.created_at,
        }
    }
}
