//! Short link entity mapping a code to its destination URL.

use chrono::{DateTime, Utc};

/// A shortened URL owned by a single owner.
///
/// Immutable after creation except for deletion, which cascades to the
/// link's metric buckets at the storage layer.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        short_code: String,
        long_url: String,
        owner_id: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_code,
            long_url,
            owner_id,
            created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub long_url: String,
    pub owner_id: i64,
}

/// A link joined with its lifetime visit total, for owner listings.
#[derive(Debug, Clone)]
pub struct LinkTotals {
    pub link_id: i64,
    pub short_code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub total_visits: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            1,
            "1hfnz4".to_string(),
            "https://example.com".to_string(),
            42,
            now,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.short_code, "1hfnz4");
        assert_eq!(link.long_url, "https://example.com");
        assert_eq!(link.owner_id, 42);
        assert_eq!(link.created_at, now);
    }

    #[test]
    fn test_new_link_creation() {
        let new_link = NewLink {
            short_code: "xyz789".to_string(),
            long_url: "https://rust-lang.org".to_string(),
            owner_id: 7,
        };

        assert_eq!(new_link.short_code, "xyz789");
        assert_eq!(new_link.owner_id, 7);
    }
}
