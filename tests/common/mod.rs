#![allow(dead_code)]

use std::sync::Arc;

use axum::routing::get;
use axum::{Router, middleware};
use snaplink::api::handlers::{health_handler, redirect_handler};
use snaplink::api::middleware::auth;
use snaplink::domain::entities::{Link, NewLink};
use snaplink::domain::repositories::{LinkRepository, OwnerRepository};
use snaplink::infrastructure::cache::NullCache;
use snaplink::infrastructure::persistence::MemoryStore;
use snaplink::state::{AppState, StateOptions};

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret";
pub const TEST_BASE_URL: &str = "https://s.example.com";

/// Builds an [`AppState`] over a shared in-memory store.
pub fn create_test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());

    let state = AppState::build(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(NullCache::new()),
        StateOptions {
            base_url: TEST_BASE_URL.to_string(),
            signing_secret: TEST_SIGNING_SECRET.to_string(),
            ..StateOptions::default()
        },
    );

    (state, store)
}

/// Full application router minus the rate limiter (which needs real socket
/// peers): public redirect and health routes plus the authenticated API.
pub fn test_router(state: AppState) -> Router {
    let api_router = snaplink::api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
}

/// Registers an owner whose bearer token is `token`; returns the owner id.
pub async fn seed_owner(store: &MemoryStore, name: &str, token: &str) -> i64 {
    let token_hash = snaplink::application::services::hash_token(TEST_SIGNING_SECRET, token);
    OwnerRepository::register(store, name, &token_hash)
        .await
        .expect("failed to seed owner")
        .id
}

/// Inserts a link row directly, bypassing code generation.
pub async fn seed_link(store: &MemoryStore, code: &str, url: &str, owner_id: i64) -> Link {
    LinkRepository::create(
        store,
        NewLink {
            short_code: code.to_string(),
            long_url: url.to_string(),
            owner_id,
        },
    )
    .await
    .expect("failed to seed link")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
