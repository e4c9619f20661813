//! DTOs for link listing.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One link in an owner's listing, with its lifetime visit total.
#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub full_short_url: String,
    pub created_at: DateTime<Utc>,
    pub total_visits: i64,
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkSummary>,
}
