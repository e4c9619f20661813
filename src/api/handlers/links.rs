//! Handlers for link listing and deletion.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::links::{LinkListResponse, LinkSummary};
use crate::domain::entities::AuthedOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the authenticated owner's links with lifetime visit totals.
///
/// # Endpoint
///
/// `GET /api/urls`
///
/// Ordered newest-first, matching the dashboard default.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthedOwner>,
) -> Result<Json<LinkListResponse>, AppError> {
    let totals = state.link_service.list_links(owner.id).await?;

    let links = totals
        .into_iter()
        .map(|t| {
            let full_short_url = state.link_service.full_short_url(&t.short_code);
            LinkSummary {
                id: t.link_id,
                short_code: t.short_code,
                long_url: t.long_url,
                full_short_url,
                created_at: t.created_at,
                total_visits: t.total_visits,
            }
        })
        .collect();

    Ok(Json(LinkListResponse { links }))
}

/// Deletes an owner's link and all of its metric buckets.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// Bucket rows cascade at the storage layer; the redirect cache entry is
/// invalidated so the dead code stops resolving before its TTL expires.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// owner.
pub async fn delete_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(owner): Extension<AuthedOwner>,
) -> Result<StatusCode, AppError> {
    let link = state.link_service.delete_link(id, owner.id).await?;

    if let Err(e) = state.cache.invalidate(&link.short_code).await {
        tracing::warn!(error = %e, short_code = %link.short_code, "failed to invalidate cache after delete");
    }

    Ok(StatusCode::NO_CONTENT)
}
