//! Bearer token authentication resolving the owning identity.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::AuthedOwner;
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Raw token entropy in bytes before base64 encoding.
const TOKEN_LENGTH_BYTES: usize = 24;

/// Service authenticating API requests and resolving their owner.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before
/// storage and comparison, so read access to the owners table is not enough
/// to forge credentials. Unlike a pure validity check, authentication here
/// yields the [`AuthedOwner`] that downstream handlers thread through link
/// creation, metrics queries and deletion.
pub struct AuthService {
    repository: Arc<dyn OwnerRepository>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when the tokens were
    /// minted (`admin token create`).
    pub fn new(repository: Arc<dyn OwnerRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw bearer token and resolves its owner.
    ///
    /// On success the owner's `last_used_at` is updated best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for unknown or revoked tokens.
    pub async fn authenticate(&self, token: &str) -> Result<AuthedOwner, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let owner = self
            .repository
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Invalid or revoked token" }),
                )
            })?;

        let _ = self.repository.touch_last_used(&token_hash).await;

        Ok(owner.into())
    }
}

/// Hashes a raw token with HMAC-SHA256 under the server signing secret.
///
/// Returns a 64-character lowercase hex MAC. Shared by the auth service,
/// the admin CLI (when minting tokens) and the test helpers.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Mints a fresh random bearer token (URL-safe base64, no padding).
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_token() -> String {
    let mut buffer = [0u8; TOKEN_LENGTH_BYTES];
    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}
