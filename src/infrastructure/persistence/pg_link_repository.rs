//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    long_url: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link::new(
            row.id,
            row.short_code,
            row.long_url,
            row.owner_id,
            row.created_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct LinkTotalsRow {
    link_id: i64,
    short_code: String,
    long_url: String,
    created_at: DateTime<Utc>,
    total_visits: i64,
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses prepared statements with bound parameters for SQL injection
/// protection.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let result = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (short_code, long_url, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, short_code, long_url, owner_id, created_at
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.long_url)
        .bind(new_link.owner_id)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) => {
                let constraint = e
                    .as_database_error()
                    .filter(|db| db.is_unique_violation())
                    .and_then(|db| db.constraint().map(str::to_owned));

                match constraint.as_deref() {
                    // Racing idempotent creates for the same (owner, URL):
                    // the first insert won, return its row.
                    Some("links_owner_long_url_key") => self
                        .find_by_owner_and_url(new_link.owner_id, &new_link.long_url)
                        .await?
                        .ok_or_else(|| e.into()),
                    Some(_) => Err(AppError::collision(
                        "short code already taken",
                        json!({ "short_code": new_link.short_code }),
                    )),
                    None => Err(e.into()),
                }
            }
        }
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, long_url, owner_id, created_at
            FROM links
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, long_url, owner_id, created_at
            FROM links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        long_url: &str,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, long_url, owner_id, created_at
            FROM links
            WHERE owner_id = $1 AND long_url = $2
            "#,
        )
        .bind(owner_id)
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<LinkTotals>, AppError> {
        let rows = sqlx::query_as::<_, LinkTotalsRow>(
            r#"
            SELECT
                l.id AS link_id,
                l.short_code,
                l.long_url,
                l.created_at,
                COALESCE(SUM(mb.visit_count), 0)::BIGINT AS total_visits
            FROM links l
            LEFT JOIN metric_buckets mb ON mb.link_id = l.id
            WHERE l.owner_id = $1
            GROUP BY l.id, l.short_code, l.long_url, l.created_at
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkTotals {
                link_id: r.link_id,
                short_code: r.short_code,
                long_url: r.long_url,
                created_at: r.created_at,
                total_visits: r.total_visits,
            })
            .collect())
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        // Metric buckets go with the link via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM links WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
