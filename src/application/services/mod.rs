//! Application services orchestrating the domain.

mod aggregation_service;
mod auth_service;
mod link_service;
mod metrics_service;
mod redirect_service;

pub use aggregation_service::{
    AggregationService, Resolution, TimeSeries, TimeSeriesPoint, Window,
};
pub use auth_service::{AuthService, generate_token, hash_token};
pub use link_service::LinkService;
pub use metrics_service::{DEFAULT_MAX_RETRIES, MetricsService};
pub use redirect_service::{DEFAULT_METRICS_TIMEOUT, RedirectService};
