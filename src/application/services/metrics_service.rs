//! Visit counting with bounded retry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::repositories::MetricsRepository;
use crate::error::AppError;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Service recording one visit per call into the hourly bucket table.
///
/// The repository upsert is already atomic; this layer adds bounded retry
/// with jittered exponential backoff for transient store failures. Retries
/// are safe because a failed upsert has not incremented anything. After the
/// attempts are exhausted the failure surfaces as
/// [`AppError::MetricsWrite`]; callers on the redirect path log it and
/// move on.
pub struct MetricsService {
    repository: Arc<dyn MetricsRepository>,
    max_retries: usize,
}

impl MetricsService {
    /// Creates a new metrics service with [`DEFAULT_MAX_RETRIES`].
    pub fn new(repository: Arc<dyn MetricsRepository>) -> Self {
        Self::with_max_retries(repository, DEFAULT_MAX_RETRIES)
    }

    /// Creates a new metrics service with an explicit retry budget.
    pub fn with_max_retries(repository: Arc<dyn MetricsRepository>, max_retries: usize) -> Self {
        Self {
            repository,
            max_retries,
        }
    }

    /// Counts one visit in the `(link_id, bucket_start)` bucket.
    ///
    /// `bucket_start` must already be floored to the hour (see
    /// [`crate::domain::entities::bucket_start_for`]).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MetricsWrite`] once the retry budget is spent.
    pub async fn bump(
        &self,
        link_id: i64,
        bucket_start: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let strategy = ExponentialBackoff::from_millis(10)
            .map(jitter)
            .take(self.max_retries);

        Retry::spawn(strategy, || async {
            self.repository.record_visit(link_id, bucket_start).await
        })
        .await
        .map_err(|e| {
            AppError::metrics_write(
                "visit not recorded",
                json!({
                    "link_id": link_id,
                    "bucket_start": bucket_start.to_rfc3339(),
                    "attempts": self.max_retries + 1,
                    "last_error": e.to_string(),
                }),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMetricsRepository;
    use chrono::TimeZone;
    use serde_json::json;

    fn hour() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bump_succeeds_first_try() {
        let mut mock_repo = MockMetricsRepository::new();

        mock_repo
            .expect_record_visit()
            .withf(|link_id, bucket_start| *link_id == 7 && *bucket_start == hour())
            .times(1)
            .returning(|_, _| Ok(()));

        let service = MetricsService::new(Arc::new(mock_repo));

        assert!(service.bump(7, hour()).await.is_ok());
    }

    #[tokio::test]
    async fn test_bump_retries_transient_failures() {
        let mut mock_repo = MockMetricsRepository::new();

        let mut attempts = 0;
        mock_repo
            .expect_record_visit()
            .times(3)
            .returning(move |_, _| {
                attempts += 1;
                if attempts < 3 {
                    Err(AppError::store("connection reset", json!({})))
                } else {
                    Ok(())
                }
            });

        let service = MetricsService::new(Arc::new(mock_repo));

        assert!(service.bump(7, hour()).await.is_ok());
    }

    #[tokio::test]
    async fn test_bump_surfaces_metrics_write_after_budget() {
        let mut mock_repo = MockMetricsRepository::new();

        // Initial attempt + 2 retries, all failing.
        mock_repo
            .expect_record_visit()
            .times(3)
            .returning(|_, _| Err(AppError::store("still down", json!({}))));

        let service = MetricsService::with_max_retries(Arc::new(mock_repo), 2);

        let result = service.bump(7, hour()).await;

        assert!(matches!(result.unwrap_err(), AppError::MetricsWrite { .. }));
    }
}
