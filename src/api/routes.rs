//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    delete_link_handler, list_links_handler, metrics_handler, shorten_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /urls`                - Create a short link (idempotent per owner+URL)
/// - `GET    /urls`                - List the caller's links with lifetime totals
/// - `GET    /links/{id}/metrics`  - Raw hourly bucket list, ascending
/// - `GET    /links/{id}/stats`    - Aggregated series (`window=today|7d|30d|90d`)
/// - `DELETE /links/{id}`          - Delete a link and its buckets
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(shorten_handler).get(list_links_handler))
        .route("/links/{id}", delete(delete_link_handler))
        .route("/links/{id}/metrics", get(metrics_handler))
        .route("/links/{id}/stats", get(stats_handler))
}
