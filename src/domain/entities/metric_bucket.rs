//! Hourly visit counter rows and bucket arithmetic.

use chrono::{DateTime, TimeDelta, Utc};

/// Ratio of estimated unique visitors to raw visits.
///
/// The estimate is a fixed multiplier of the visit count; real visitor
/// identification (cookie or IP based) is a separate feature this system
/// does not implement.
const UNIQUE_VISITOR_RATIO: f64 = 0.7;

/// One hour of traffic for one link.
///
/// At most one bucket exists per `(link_id, bucket_start)`; the bucket is
/// created lazily on the first visit of the hour and incremented on every
/// subsequent visit. Rows are only removed when their link is deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBucket {
    pub id: i64,
    pub link_id: i64,
    pub bucket_start: DateTime<Utc>,
    pub visit_count: i64,
    pub unique_visitor_estimate: i64,
    pub created_at: DateTime<Utc>,
}

/// Floors a timestamp to the top of its UTC hour.
///
/// `10:59:59Z` and `10:00:01Z` map to the same `10:00:00Z` bucket;
/// `11:00:00Z` starts a new one.
pub fn bucket_start_for(ts: DateTime<Utc>) -> DateTime<Utc> {
    use chrono::DurationRound;
    // Only fails outside chrono's representable range.
    ts.duration_trunc(TimeDelta::hours(1)).unwrap_or(ts)
}

/// Floors a timestamp to its UTC calendar day.
pub fn day_start_for(ts: DateTime<Utc>) -> DateTime<Utc> {
    use chrono::DurationRound;
    ts.duration_trunc(TimeDelta::days(1)).unwrap_or(ts)
}

/// Fixed-ratio unique visitor estimate for a given visit count.
pub fn estimate_unique_visitors(visit_count: i64) -> i64 {
    if visit_count <= 0 {
        return 0;
    }
    ((visit_count as f64 * UNIQUE_VISITOR_RATIO).round() as i64).max(1)
}
