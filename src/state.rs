//! Shared application state injected into all handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    AggregationService, AuthService, DEFAULT_METRICS_TIMEOUT, LinkService, MetricsService,
    RedirectService,
};
use crate::domain::repositories::{LinkRepository, MetricsRepository, OwnerRepository};
use crate::infrastructure::cache::CacheService;

/// Tunables for building an [`AppState`].
///
/// Defaults are suitable for tests; production values come from
/// [`crate::config::Config`].
pub struct StateOptions {
    pub base_url: String,
    pub signing_secret: String,
    pub metrics_timeout: Duration,
    pub metrics_max_retries: usize,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            signing_secret: "insecure-dev-secret".to_string(),
            metrics_timeout: DEFAULT_METRICS_TIMEOUT,
            metrics_max_retries: crate::application::services::DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub aggregation_service: Arc<AggregationService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
    /// Direct repository handle for the health probe.
    pub link_repository: Arc<dyn LinkRepository>,
}

impl AppState {
    /// Wires the service graph over a set of repositories and a cache.
    ///
    /// Any repository/cache combination works: PostgreSQL in production,
    /// [`crate::infrastructure::persistence::MemoryStore`] in tests.
    pub fn build(
        link_repository: Arc<dyn LinkRepository>,
        metrics_repository: Arc<dyn MetricsRepository>,
        owner_repository: Arc<dyn OwnerRepository>,
        cache: Arc<dyn CacheService>,
        options: StateOptions,
    ) -> Self {
        let metrics_service = Arc::new(MetricsService::with_max_retries(
            Arc::clone(&metrics_repository),
            options.metrics_max_retries,
        ));

        let link_service = Arc::new(LinkService::new(
            Arc::clone(&link_repository),
            options.base_url,
        ));

        let redirect_service = Arc::new(RedirectService::new(
            Arc::clone(&link_repository),
            Arc::clone(&metrics_service),
            Arc::clone(&cache),
            options.metrics_timeout,
        ));

        let aggregation_service = Arc::new(AggregationService::new(
            Arc::clone(&link_repository),
            Arc::clone(&metrics_repository),
        ));

        let auth_service = Arc::new(AuthService::new(owner_repository, options.signing_secret));

        Self {
            link_service,
            redirect_service,
            aggregation_service,
            auth_service,
            cache,
            link_repository,
        }
    }
}
