//! Handlers for per-link metrics and aggregated statistics.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::metrics::{
    BucketInfo, MetricsResponse, PointInfo, StatsQueryParams, StatsResponse, WindowParam,
    resolution_name,
};
use crate::domain::entities::AuthedOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the raw hourly bucket list for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}/metrics`
///
/// Buckets are ordered ascending by `bucket_start`. Hours without traffic
/// have no row.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// owner.
pub async fn metrics_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthedOwner>,
) -> Result<Json<MetricsResponse>, AppError> {
    let link = state.link_service.get_owned_link(id, owner.id).await?;

    let buckets = state.aggregation_service.buckets(link.id).await?;

    Ok(Json(MetricsResponse {
        link_id: link.id,
        short_code: link.short_code,
        buckets: buckets
            .into_iter()
            .map(|b| BucketInfo {
                bucket_start: b.bucket_start,
                visit_count: b.visit_count,
                unique_visitor_estimate: b.unique_visitor_estimate,
            })
            .collect(),
    }))
}

/// Returns an aggregated time series for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}/stats?window=today|7d|30d|90d`
///
/// `today` is hourly resolution; the day windows group by UTC calendar day.
/// Defaults to `7d`. The series is sparse and sorted ascending.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// owner, and 400 for an unknown window value.
pub async fn stats_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthedOwner>,
    Query(params): Query<StatsQueryParams>,
) -> Result<Json<StatsResponse>, AppError> {
    let link = state.link_service.get_owned_link(id, owner.id).await?;

    let window_param = params.window.unwrap_or(WindowParam::Last7Days);
    let series = state
        .aggregation_service
        .aggregate(link.id, window_param.into())
        .await?;

    Ok(Json(StatsResponse {
        link_id: link.id,
        window: window_param,
        resolution: resolution_name(series.resolution),
        points: series
            .points
            .into_iter()
            .map(|p| PointInfo {
                timestamp: p.timestamp,
                visits: p.visits,
                unique_visitors: p.unique_visitors,
            })
            .collect(),
    }))
}
