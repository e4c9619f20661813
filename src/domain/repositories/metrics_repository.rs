//! Repository trait for time-bucketed visit counters.

use crate::domain::entities::MetricBucket;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the metric bucket table.
///
/// The one hard requirement on implementations is that
/// [`record_visit`](MetricsRepository::record_visit) is atomic: two
/// concurrent visits to the same `(link_id, bucket_start)` must both be
/// counted and must never produce two rows. The PostgreSQL backend uses
/// `INSERT ... ON CONFLICT DO UPDATE` against the unique constraint; the
/// in-memory backend holds its map lock across the read-modify-write.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMetricsRepository`]
/// - [`crate::infrastructure::persistence::MemoryStore`]
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Counts one visit in the bucket, creating the row if needed.
    ///
    /// `bucket_start` must already be floored to the hour; implementations
    /// store it as given. Inserts `visit_count = 1` for a fresh bucket,
    /// otherwise increments by one, and recomputes the fixed-ratio unique
    /// visitor estimate in the same operation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on database errors. Callers wanting
    /// bounded retry wrap this call (see `MetricsService::bump`).
    async fn record_visit(
        &self,
        link_id: i64,
        bucket_start: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Fetches a link's buckets within `[from, to)`, ascending by
    /// `bucket_start`. `None` bounds are open.
    async fn list_buckets(
        &self,
        link_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricBucket>, AppError>;

    /// Sums `visit_count` over all of a link's buckets.
    async fn total_visits(&self, link_id: i64) -> Result<i64, AppError>;
}
