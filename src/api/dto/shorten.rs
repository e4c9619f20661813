//! DTOs for the URL shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single long URL.
///
/// Scheme and structure checks happen in the URL normalizer; validation
/// here only rejects the obviously hopeless before the service runs.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(length(min = 1, max = 2048, message = "long_url must be 1-2048 characters"))]
    pub long_url: String,
}

/// A created (or pre-existing) short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub long_url: String,
    pub full_short_url: String,
}
