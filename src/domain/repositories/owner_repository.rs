//! Repository trait for owner credentials.

use crate::domain::entities::Owner;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for owner lookup and credential management.
///
/// Tokens are stored only as HMAC-SHA256 hashes; the plaintext exists
/// solely in the `admin token create` output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    /// Resolves a token hash to its owner. Revoked owners resolve to `None`.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Owner>, AppError>;

    /// Registers an owner with the given credential hash.
    async fn register(&self, name: &str, token_hash: &str) -> Result<Owner, AppError>;

    /// Updates `last_used_at` for audit purposes. Best-effort.
    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Revokes all credentials registered under `name`.
    ///
    /// Returns `Ok(false)` if no matching owner exists.
    async fn revoke(&self, name: &str) -> Result<bool, AppError>;

    /// Lists all owners, newest first.
    async fn list(&self) -> Result<Vec<Owner>, AppError>;
}
