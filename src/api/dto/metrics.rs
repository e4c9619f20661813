//! DTOs for metrics and aggregated statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{Resolution, Window};

/// One raw hourly bucket.
#[derive(Debug, Serialize)]
pub struct BucketInfo {
    pub bucket_start: DateTime<Utc>,
    pub visit_count: i64,
    pub unique_visitor_estimate: i64,
}

/// Ordered raw bucket list for a link.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub link_id: i64,
    pub short_code: String,
    pub buckets: Vec<BucketInfo>,
}

/// Query parameters for the stats endpoint.
#[derive(Debug, Deserialize)]
pub struct StatsQueryParams {
    pub window: Option<WindowParam>,
}

/// Wire form of [`Window`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum WindowParam {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl From<WindowParam> for Window {
    fn from(param: WindowParam) -> Self {
        match param {
            WindowParam::Today => Window::Today,
            WindowParam::Last7Days => Window::Last7Days,
            WindowParam::Last30Days => Window::Last30Days,
            WindowParam::Last90Days => Window::Last90Days,
        }
    }
}

/// One aggregated series point.
#[derive(Debug, Serialize)]
pub struct PointInfo {
    pub timestamp: DateTime<Utc>,
    pub visits: i64,
    pub unique_visitors: i64,
}

/// Aggregated time series for a link and window.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub link_id: i64,
    pub window: WindowParam,
    pub resolution: &'static str,
    pub points: Vec<PointInfo>,
}

/// Wire name of a [`Resolution`].
pub fn resolution_name(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Hourly => "hourly",
        Resolution::Daily => "daily",
    }
}
