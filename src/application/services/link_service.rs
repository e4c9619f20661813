//! Link creation, listing and deletion.

use std::sync::Arc;

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

/// Service for creating and managing shortened links.
///
/// Short codes are a deterministic function of `(normalized URL, owner)`,
/// so creation is idempotent per owner: shortening the same URL again
/// returns the existing row. Codes live in one global namespace; a
/// generated code that is already taken (necessarily by a different owner
/// or URL, given determinism) is a collision and is rejected, never
/// overwritten.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `base_url` is the public origin short URLs are served from, e.g.
    /// `https://snap.example.com`.
    pub fn new(link_repository: Arc<dyn LinkRepository>, base_url: String) -> Self {
        Self {
            link_repository,
            base_url,
        }
    }

    /// Creates a short link for an owner, or returns the existing one.
    ///
    /// Validation happens before any state is touched: a malformed or
    /// non-HTTP(S) URL fails here and nothing is hashed or written.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL,
    /// [`AppError::Collision`] when the derived code is already taken by a
    /// different `(owner, URL)` pair, and [`AppError::Store`] on database
    /// errors.
    pub async fn create_short_link(
        &self,
        owner_id: i64,
        long_url: String,
    ) -> Result<Link, AppError> {
        let normalized_url = normalize_url(&long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(existing_link) = self
            .link_repository
            .find_by_owner_and_url(owner_id, &normalized_url)
            .await?
        {
            return Ok(existing_link);
        }

        let short_code = generate_code(&normalized_url, owner_id);

        // The code space does not partition by owner, so the uniqueness
        // check is global. The database constraint backstops this under
        // racing creators.
        if let Some(taken) = self.link_repository.find_by_code(&short_code).await? {
            return Err(AppError::collision(
                "generated code is already taken",
                json!({ "short_code": short_code, "holder_owner_id": taken.owner_id }),
            ));
        }

        let new_link = NewLink {
            short_code,
            long_url: normalized_url,
            owner_id,
        };

        self.link_repository.create(new_link).await
    }

    /// Retrieves a link by id, scoped to its owner.
    ///
    /// A link that exists but belongs to another owner is reported as
    /// [`AppError::NotFound`], indistinguishable from an unknown id.
    pub async fn get_owned_link(&self, id: i64, owner_id: i64) -> Result<Link, AppError> {
        let link = self
            .link_repository
            .find_by_id(id)
            .await?
            .filter(|l| l.owner_id == owner_id);

        link.ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Lists an owner's links newest-first with lifetime visit totals.
    pub async fn list_links(&self, owner_id: i64) -> Result<Vec<LinkTotals>, AppError> {
        self.link_repository.list_by_owner(owner_id).await
    }

    /// Deletes an owner's link; metric buckets cascade at the storage layer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is unknown or belongs to a
    /// different owner.
    pub async fn delete_link(&self, id: i64, owner_id: i64) -> Result<Link, AppError> {
        // Fetch first so the caller can invalidate the cache entry by code.
        let link = self.get_owned_link(id, owner_id).await?;

        let deleted = self.link_repository.delete(id, owner_id).await?;
        if !deleted {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        }

        Ok(link)
    }

    /// Constructs the public short URL for a code.
    pub fn full_short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), short_code)
    }
}
