//! No-op cache used when Redis is not configured.

use super::service::{CacheResult, CacheService, CachedLink};
use async_trait::async_trait;

/// Cache implementation that caches nothing.
///
/// Every lookup is a miss, so redirects always hit the database. Used as
/// the fallback when no `REDIS_URL` is configured or the connection fails
/// at startup.
#[derive(Default)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _short_code: &str) -> CacheResult<Option<CachedLink>> {
        Ok(None)
    }

    async fn set_link(
        &self,
        _short_code: &str,
        _link: &CachedLink,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
