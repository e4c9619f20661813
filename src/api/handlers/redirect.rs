//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL and counts the visit.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Caching
///
/// The 307 carries `Cache-Control: no-store, no-cache, must-revalidate` so
/// neither clients nor intermediaries replay the redirect from cache;
/// every hit must reach this handler to be counted.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let long_url = state.redirect_service.resolve(&code).await?;

    let location = HeaderValue::from_str(&long_url).map_err(|_| {
        AppError::store(
            "Stored URL is not a valid header value",
            serde_json::json!({ "short_code": code }),
        )
    })?;

    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );

    Ok(response)
}
