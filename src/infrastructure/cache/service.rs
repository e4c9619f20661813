//! Cache service trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cached resolution of a short code.
///
/// Carries the link id alongside the destination so the metrics bump works
/// on cache hits without a database round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLink {
    pub link_id: i64,
    pub long_url: String,
}

/// Trait for caching short code resolutions.
///
/// Implementations must be thread-safe and fail open: cache trouble
/// degrades to a database lookup, never to a failed redirect.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL
/// - [`crate::infrastructure::cache::NullCache`] - no-op for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached resolution for a short code.
    ///
    /// Returns `Ok(None)` on miss; production implementations also map
    /// backend errors to `Ok(None)` after logging.
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<CachedLink>>;

    /// Stores a resolution with an optional TTL override (seconds).
    async fn set_link(
        &self,
        short_code: &str,
        link: &CachedLink,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Drops a cached resolution, e.g. after the link is deleted.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Reports backend health for the health endpoint.
    async fn health_check(&self) -> bool;
}
