use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use vitrine_core::error::AppError;
use vitrine_core::resource::{Assignment, FieldValue, ResourceSpec};

/// Generic repository for one display resource, driven entirely by its [`ResourceSpec`].
///
/// Table and column names come from the static descriptor, never from request input; all
/// values are bound as parameters.
#[derive(Clone)]
pub struct ContentRepository {
    pool: Pool<Postgres>,
    spec: &'static ResourceSpec,
}

impl ContentRepository {
    pub fn new(pool: PgPool, spec: &'static ResourceSpec) -> Self {
        Self { pool, spec }
    }

    /// All records as camelCase JSON objects, by ascending display order. Ties keep
    /// insertion order.
    pub async fn list(&self) -> Result<Vec<serde_json::Value>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} ASC, created_at ASC, id ASC",
            json_projection(self.spec),
            self.spec.table,
            self.spec.order_column,
        );

        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|(record,)| record).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<serde_json::Value>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            json_projection(self.spec),
            self.spec.table,
        );

        let row: Option<(serde_json::Value,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(record,)| record))
    }

    /// Insert one record built by [`ResourceSpec::new_record`]. Returns the generated UUID.
    pub async fn create(&self, record: Vec<Assignment>) -> Result<Uuid, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", self.spec.table));
        for (i, assignment) in record.iter().enumerate() {
            if i > 0 {
                query.push(", ");
            }
            query.push(assignment.column);
        }
        query.push(") VALUES (");
        for (i, assignment) in record.into_iter().enumerate() {
            if i > 0 {
                query.push(", ");
            }
            push_value(&mut query, assignment.value);
        }
        query.push(") RETURNING id");

        let (id,): (Uuid,) = query
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        tracing::debug!(resource = self.spec.path, %id, "record created");
        Ok(id)
    }

    /// Apply a change set built by [`ResourceSpec::changes`]. Returns false when no record
    /// has the given id.
    pub async fn update(&self, id: Uuid, changes: Vec<Assignment>) -> Result<bool, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", self.spec.table));
        for assignment in changes {
            query.push(assignment.column).push(" = ");
            push_value(&mut query, assignment.value);
            query.push(", ");
        }
        query.push("updated_at = NOW() WHERE id = ").push_bind(id);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete by primary key. Returns the number of removed rows (0 or 1).
    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.spec.table);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn push_value(query: &mut QueryBuilder<'_, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Text(text) => {
            query.push_bind(text);
        }
        FieldValue::OptionalText(text) => {
            query.push_bind(text);
        }
        FieldValue::Integer(n) => {
            query.push_bind(n);
        }
    }
}

/// `json_build_object('id', id, 'title', title, ...)` over every described column.
fn json_projection(spec: &ResourceSpec) -> String {
    let mut pairs = vec!["'id', id".to_string()];
    pairs.extend(
        spec.columns
            .iter()
            .map(|c| format!("'{}', {}", c.key, c.name)),
    );
    pairs.push("'createdAt', created_at".to_string());
    pairs.push("'updatedAt', updated_at".to_string());
    format!("json_build_object({})", pairs.join(", "))
}
