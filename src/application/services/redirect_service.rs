//! Short code resolution on the redirect critical path.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{error, warn};

use crate::application::services::MetricsService;
use crate::domain::entities::bucket_start_for;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedLink};

/// Default budget for the in-path metrics bump.
pub const DEFAULT_METRICS_TIMEOUT: Duration = Duration::from_millis(500);

/// Service resolving a short code to its destination and counting the hit.
///
/// Resolution order: cache, then database (populating the cache off the
/// request path). The metrics bump runs before the URL is returned but
/// under its own short timeout, so a slow or failing metrics write degrades
/// to "redirect succeeded, metric dropped" instead of stalling the
/// user-visible redirect. Analytics never gate redirects.
pub struct RedirectService {
    link_repository: Arc<dyn LinkRepository>,
    metrics: Arc<MetricsService>,
    cache: Arc<dyn CacheService>,
    metrics_timeout: Duration,
}

impl RedirectService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        metrics: Arc<MetricsService>,
        cache: Arc<dyn CacheService>,
        metrics_timeout: Duration,
    ) -> Self {
        Self {
            link_repository,
            metrics,
            cache,
            metrics_timeout,
        }
    }

    /// Resolves a short code to its long URL, counting the visit in the
    /// current hour bucket.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown code and
    /// [`AppError::Store`] on database errors. Metrics failures are logged
    /// and counted, never returned.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        let cached = match self.cache.get_link(short_code).await {
            Ok(cached) => cached,
            Err(e) => {
                error!(error = %e, short_code, "cache lookup failed, falling back to database");
                None
            }
        };

        let resolved = match cached {
            Some(entry) => entry,
            None => {
                let link = self
                    .link_repository
                    .find_by_code(short_code)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(
                            "Short URL not found",
                            json!({ "short_code": short_code }),
                        )
                    })?;

                let entry = CachedLink {
                    link_id: link.id,
                    long_url: link.long_url,
                };

                // Populate the cache off the request path.
                let cache = Arc::clone(&self.cache);
                let code = short_code.to_string();
                let to_cache = entry.clone();
                tokio::spawn(async move {
                    if let Err(e) = cache.set_link(&code, &to_cache, None).await {
                        error!(error = %e, short_code = %code, "failed to cache resolution");
                    }
                });

                entry
            }
        };

        self.bump_best_effort(resolved.link_id, short_code).await;

        metrics::counter!("redirects_resolved_total").increment(1);

        Ok(resolved.long_url)
    }

    /// Runs the metrics bump under the metrics timeout, swallowing failures.
    async fn bump_best_effort(&self, link_id: i64, short_code: &str) {
        let bucket_start = bucket_start_for(Utc::now());

        let bump = self.metrics.bump(link_id, bucket_start);
        match tokio::time::timeout(self.metrics_timeout, bump).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, short_code, link_id, "visit not recorded");
                metrics::counter!("visits_dropped_total").increment(1);
            }
            Err(_) => {
                warn!(
                    short_code,
                    link_id,
                    timeout_ms = self.metrics_timeout.as_millis() as u64,
                    "visit recording timed out"
                );
                metrics::counter!("visits_dropped_total").increment(1);
            }
        }
    }
}
