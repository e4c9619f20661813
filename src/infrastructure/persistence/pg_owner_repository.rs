//! PostgreSQL implementation of the owner repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Owner;
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: i64,
    name: String,
    revoked: bool,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Owner {
            id: row.id,
            name: row.name,
            revoked: row.revoked,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
        }
    }
}

/// PostgreSQL repository for owner credentials.
pub struct PgOwnerRepository {
    pool: Arc<PgPool>,
}

impl PgOwnerRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Owner>, AppError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            SELECT id, name, revoked, created_at, last_used_at
            FROM owners
            WHERE token_hash = $1 AND NOT revoked
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Owner::from))
    }

    async fn register(&self, name: &str, token_hash: &str) -> Result<Owner, AppError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            INSERT INTO owners (name, token_hash)
            VALUES ($1, $2)
            RETURNING id, name, revoked, created_at, last_used_at
            "#,
        )
        .bind(name)
        .bind(token_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE owners SET last_used_at = NOW() WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn revoke(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE owners SET revoked = TRUE WHERE name = $1 AND NOT revoked")
            .bind(name)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Owner>, AppError> {
        let rows = sqlx::query_as::<_, OwnerRow>(
            r#"
            SELECT id, name, revoked, created_at, last_used_at
            FROM owners
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Owner::from).collect())
    }
}
