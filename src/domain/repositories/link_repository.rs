//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collision`] if the short code is already taken
    /// (the `UNIQUE(short_code)` constraint backstops the caller's
    /// pre-insert check under racing creators).
    /// Returns [`AppError::Store`] on other database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code, across all owners.
    ///
    /// The short code space does not partition by owner, so redirect
    /// resolution and collision checks both look up globally.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by id, regardless of owner.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds an owner's link for an already-normalized long URL.
    ///
    /// Used for idempotent re-shortening: if the pair exists, the caller
    /// returns the existing row instead of inserting a duplicate.
    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        long_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Lists an owner's links newest-first, each with its lifetime visit total.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<LinkTotals>, AppError>;

    /// Hard-deletes a link if it belongs to `owner_id`.
    ///
    /// Metric buckets cascade at the storage layer. Returns `Ok(false)` when
    /// no matching row exists (unknown id or different owner).
    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError>;
}
