//! Windowed aggregation of hourly buckets for display.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use crate::domain::entities::{MetricBucket, day_start_for};
use crate::domain::repositories::{LinkRepository, MetricsRepository};
use crate::error::AppError;

/// Display window for a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Today,
    Last7Days,
    Last30Days,
    Last90Days,
}

/// Resolution of the output series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hourly,
    Daily,
}

impl Window {
    /// Output resolution: hourly for today, daily for the longer windows.
    pub fn resolution(self) -> Resolution {
        match self {
            Window::Today => Resolution::Hourly,
            _ => Resolution::Daily,
        }
    }

    /// Inclusive window start relative to `now`.
    ///
    /// An N-day window covers the N UTC calendar days ending today, so the
    /// start is midnight N-1 days ago. "Today" starts at the current UTC
    /// midnight.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = day_start_for(now);
        match self {
            Window::Today => today,
            Window::Last7Days => today - TimeDelta::days(6),
            Window::Last30Days => today - TimeDelta::days(29),
            Window::Last90Days => today - TimeDelta::days(89),
        }
    }
}

/// One aggregated point of a time series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub visits: i64,
    pub unique_visitors: i64,
}

/// Sparse, ascending time series for one link and window.
///
/// Hours or days with no traffic have no point; zero-filling is a
/// presentation concern left to callers.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub window: Window,
    pub resolution: Resolution,
    pub points: Vec<TimeSeriesPoint>,
}

/// Service summing hourly buckets into display series and lifetime totals.
pub struct AggregationService {
    link_repository: Arc<dyn LinkRepository>,
    metrics_repository: Arc<dyn MetricsRepository>,
}

impl AggregationService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        metrics_repository: Arc<dyn MetricsRepository>,
    ) -> Self {
        Self {
            link_repository,
            metrics_repository,
        }
    }

    /// Aggregates a link's buckets over `window`, ending now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown (or deleted) link id:
    /// a deleted link's buckets are gone via cascade, and this check keeps
    /// the result distinguishable from "exists but no traffic".
    pub async fn aggregate(&self, link_id: i64, window: Window) -> Result<TimeSeries, AppError> {
        self.aggregate_at(link_id, window, Utc::now()).await
    }

    /// Clock-explicit variant of [`aggregate`](Self::aggregate).
    pub async fn aggregate_at(
        &self,
        link_id: i64,
        window: Window,
        now: DateTime<Utc>,
    ) -> Result<TimeSeries, AppError> {
        self.ensure_link_exists(link_id).await?;

        let buckets = self
            .metrics_repository
            .list_buckets(link_id, Some(window.start(now)), None)
            .await?;

        let points = match window.resolution() {
            Resolution::Hourly => {
                let mut points: Vec<TimeSeriesPoint> = buckets
                    .into_iter()
                    .map(|b| TimeSeriesPoint {
                        timestamp: b.bucket_start,
                        visits: b.visit_count,
                        unique_visitors: b.unique_visitor_estimate,
                    })
                    .collect();
                // Repositories return ascending order, but the output
                // contract does not depend on it.
                points.sort_by_key(|p| p.timestamp);
                points
            }
            Resolution::Daily => {
                // Group hourly buckets by UTC calendar day. BTreeMap keeps
                // the days ascending.
                let mut days: BTreeMap<DateTime<Utc>, (i64, i64)> = BTreeMap::new();
                for bucket in buckets {
                    let day = days.entry(day_start_for(bucket.bucket_start)).or_default();
                    day.0 += bucket.visit_count;
                    day.1 += bucket.unique_visitor_estimate;
                }
                days.into_iter()
                    .map(|(timestamp, (visits, unique_visitors))| TimeSeriesPoint {
                        timestamp,
                        visits,
                        unique_visitors,
                    })
                    .collect()
            }
        };

        Ok(TimeSeries {
            window,
            resolution: window.resolution(),
            points,
        })
    }

    /// Raw bucket list for a link, full history, ascending by hour.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown link id.
    pub async fn buckets(&self, link_id: i64) -> Result<Vec<MetricBucket>, AppError> {
        self.ensure_link_exists(link_id).await?;
        self.metrics_repository
            .list_buckets(link_id, None, None)
            .await
    }

    /// Lifetime visit total for a link, all buckets regardless of window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown link id.
    pub async fn total(&self, link_id: i64) -> Result<i64, AppError> {
        self.ensure_link_exists(link_id).await?;
        self.metrics_repository.total_visits(link_id).await
    }

    async fn ensure_link_exists(&self, link_id: i64) -> Result<(), AppError> {
        self.link_repository
            .find_by_id(link_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link_id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Link, MetricBucket};
    use crate::domain::repositories::{MockLinkRepository, MockMetricsRepository};
    use chrono::TimeZone;

    fn link_repo_with_link(id: i64) -> MockLinkRepository {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id().returning(move |_| {
            Ok(Some(Link::new(
                id,
                "abc123".to_string(),
                "https://example.com/".to_string(),
                1,
                Utc::now(),
            )))
        });
        repo
    }

    fn bucket(link_id: i64, bucket_start: DateTime<Utc>, visits: i64) -> MetricBucket {
        MetricBucket {
            id: 0,
            link_id,
            bucket_start,
            visit_count: visits,
            unique_visitor_estimate: visits,
            created_at: bucket_start,
        }
    }

    #[test]
    fn test_window_resolution() {
        assert_eq!(Window::Today.resolution(), Resolution::Hourly);
        assert_eq!(Window::Last7Days.resolution(), Resolution::Daily);
        assert_eq!(Window::Last30Days.resolution(), Resolution::Daily);
        assert_eq!(Window::Last90Days.resolution(), Resolution::Daily);
    }

    #[test]
    fn test_window_start_covers_calendar_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 0).unwrap();

        assert_eq!(
            Window::Today.start(now),
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            Window::Last7Days.start(now),
            Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_aggregate_unknown_link_is_not_found() {
        let mut link_repo = MockLinkRepository::new();
        link_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut metrics_repo = MockMetricsRepository::new();
        metrics_repo.expect_list_buckets().times(0);

        let service = AggregationService::new(Arc::new(link_repo), Arc::new(metrics_repo));

        let result = service.aggregate(42, Window::Today).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_aggregate_today_keeps_hourly_points() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 0).unwrap();
        let h10 = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let h12 = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let mut metrics_repo = MockMetricsRepository::new();
        metrics_repo
            .expect_list_buckets()
            .withf(move |_, from, to| *from == Some(Window::Today.start(now)) && to.is_none())
            .times(1)
            // Deliberately out of order to exercise the sort.
            .returning(move |_, _, _| Ok(vec![bucket(1, h12, 5), bucket(1, h10, 2)]));

        let service = AggregationService::new(
            Arc::new(link_repo_with_link(1)),
            Arc::new(metrics_repo),
        );

        let series = service.aggregate_at(1, Window::Today, now).await.unwrap();

        assert_eq!(series.resolution, Resolution::Hourly);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].timestamp, h10);
        assert_eq!(series.points[0].visits, 2);
        assert_eq!(series.points[1].timestamp, h12);
        assert_eq!(series.points[1].visits, 5);
    }

    #[tokio::test]
    async fn test_aggregate_daily_groups_by_utc_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 0).unwrap();
        let day1_morning = Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap();
        let day1_evening = Utc.with_ymd_and_hms(2024, 3, 14, 23, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();

        let mut metrics_repo = MockMetricsRepository::new();
        metrics_repo.expect_list_buckets().times(1).returning(
            move |_, _, _| {
                Ok(vec![
                    bucket(1, day2, 1),
                    bucket(1, day1_morning, 3),
                    bucket(1, day1_evening, 4),
                ])
            },
        );

        let service = AggregationService::new(
            Arc::new(link_repo_with_link(1)),
            Arc::new(metrics_repo),
        );

        let series = service
            .aggregate_at(1, Window::Last7Days, now)
            .await
            .unwrap();

        assert_eq!(series.resolution, Resolution::Daily);
        assert_eq!(series.points.len(), 2);

        // 2024-03-14: two hourly buckets summed into one day.
        assert_eq!(
            series.points[0].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap()
        );
        assert_eq!(series.points[0].visits, 7);

        assert_eq!(
            series.points[1].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(series.points[1].visits, 1);
    }

    #[tokio::test]
    async fn test_aggregate_empty_series_is_ok() {
        let mut metrics_repo = MockMetricsRepository::new();
        metrics_repo
            .expect_list_buckets()
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = AggregationService::new(
            Arc::new(link_repo_with_link(1)),
            Arc::new(metrics_repo),
        );

        let series = service.aggregate(1, Window::Last30Days).await.unwrap();
        assert!(series.points.is_empty());
    }

    #[tokio::test]
    async fn test_total_sums_all_buckets() {
        let mut metrics_repo = MockMetricsRepository::new();
        metrics_repo
            .expect_total_visits()
            .times(1)
            .returning(|_| Ok(123));

        let service = AggregationService::new(
            Arc::new(link_repo_with_link(1)),
            Arc::new(metrics_repo),
        );

        assert_eq!(service.total(1).await.unwrap(), 123);
    }
}
