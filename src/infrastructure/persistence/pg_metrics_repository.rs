//! PostgreSQL implementation of the metrics repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::MetricBucket;
use crate::domain::repositories::MetricsRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct MetricBucketRow {
    id: i64,
    link_id: i64,
    bucket_start: DateTime<Utc>,
    visit_count: i64,
    unique_visitor_estimate: i64,
    created_at: DateTime<Utc>,
}

impl From<MetricBucketRow> for MetricBucket {
    fn from(row: MetricBucketRow) -> Self {
        MetricBucket {
            id: row.id,
            link_id: row.link_id,
            bucket_start: row.bucket_start,
            visit_count: row.visit_count,
            unique_visitor_estimate: row.unique_visitor_estimate,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for hourly visit counters.
///
/// The insert-or-increment runs as a single `INSERT ... ON CONFLICT DO
/// UPDATE` statement against `UNIQUE(link_id, bucket_start)`, so concurrent
/// visits to the same bucket serialize inside the database: no lost updates
/// and no duplicate rows without any application-side locking.
pub struct PgMetricsRepository {
    pool: Arc<PgPool>,
}

impl PgMetricsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricsRepository for PgMetricsRepository {
    async fn record_visit(
        &self,
        link_id: i64,
        bucket_start: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO metric_buckets (link_id, bucket_start, visit_count, unique_visitor_estimate)
            VALUES ($1, $2, 1, 1)
            ON CONFLICT (link_id, bucket_start) DO UPDATE
            SET visit_count = metric_buckets.visit_count + 1,
                unique_visitor_estimate =
                    GREATEST(1, ROUND((metric_buckets.visit_count + 1) * 0.7))::BIGINT
            "#,
        )
        .bind(link_id)
        .bind(bucket_start)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list_buckets(
        &self,
        link_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricBucket>, AppError> {
        let rows = sqlx::query_as::<_, MetricBucketRow>(
            r#"
            SELECT id, link_id, bucket_start, visit_count, unique_visitor_estimate, created_at
            FROM metric_buckets
            WHERE link_id = $1
              AND ($2::timestamptz IS NULL OR bucket_start >= $2)
              AND ($3::timestamptz IS NULL OR bucket_start < $3)
            ORDER BY bucket_start ASC
            "#,
        )
        .bind(link_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(MetricBucket::from).collect())
    }

    async fn total_visits(&self, link_id: i64) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(visit_count), 0)::BIGINT
            FROM metric_buckets
            WHERE link_id = $1
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(total)
    }
}
