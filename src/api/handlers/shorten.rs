//! Handler for the URL shortening endpoint.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::domain::entities::AuthedOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated owner.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Behavior
///
/// The short code is a deterministic function of the normalized URL and the
/// owner, so repeating the call returns the same code without creating a
/// duplicate row.
///
/// # Errors
///
/// Returns 400 Bad Request for a missing or malformed URL (before any state
/// is touched), 401 without a valid bearer token, and 500 on store failure
/// or a (vanishingly rare) short code collision.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthedOwner>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(owner.id, payload.long_url)
        .await?;

    let full_short_url = state.link_service.full_short_url(&link.short_code);

    Ok(Json(ShortenResponse {
        short_code: link.short_code,
        long_url: link.long_url,
        full_short_url,
    }))
}
