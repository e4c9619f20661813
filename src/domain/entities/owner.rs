//! Owner entity: the identity a link is scoped to.

use chrono::{DateTime, Utc};

/// An API credential holder. Links and their metrics belong to exactly one
/// owner; the owner id is also folded into short code derivation, so two
/// owners shortening the same URL get different codes.
#[derive(Debug, Clone)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// The authenticated caller attached to a request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthedOwner {
    pub id: i64,
    pub name: String,
}

impl From<Owner> for AuthedOwner {
    fn from(owner: Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name,
        }
    }
}
