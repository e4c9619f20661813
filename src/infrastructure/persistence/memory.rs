//! In-memory implementation of all repositories.
//!
//! Backs the integration test suite and local experiments: no external
//! services, same observable semantics as the PostgreSQL backend. One
//! `MemoryStore` implements all three repository traits so that link
//! deletion can cascade to metric buckets the way the database foreign key
//! does.
//!
//! Concurrency: the bucket map mutex is held across the whole
//! read-modify-write in [`record_visit`](MetricsRepository::record_visit),
//! which is the per-row-lock variant of the upsert contract. Locks are
//! never held across `.await` points.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{
    Link, LinkTotals, MetricBucket, NewLink, Owner, estimate_unique_visitors,
};
use crate::domain::repositories::{LinkRepository, MetricsRepository, OwnerRepository};
use crate::error::AppError;

struct OwnerRecord {
    owner: Owner,
    token_hash: String,
}

/// Shared in-memory store implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    links: Mutex<Vec<Link>>,
    buckets: Mutex<HashMap<(i64, DateTime<Utc>), MetricBucket>>,
    owners: Mutex<Vec<OwnerRecord>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().expect("links lock poisoned");

        // Same (owner, URL) pair: idempotent, hand back the winner.
        if let Some(existing) = links
            .iter()
            .find(|l| l.owner_id == new_link.owner_id && l.long_url == new_link.long_url)
        {
            return Ok(existing.clone());
        }

        if links.iter().any(|l| l.short_code == new_link.short_code) {
            return Err(AppError::collision(
                "short code already taken",
                json!({ "short_code": new_link.short_code }),
            ));
        }

        let link = Link::new(
            self.next_id(),
            new_link.short_code,
            new_link.long_url,
            new_link.owner_id,
            Utc::now(),
        );
        links.push(link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().expect("links lock poisoned");
        Ok(links.iter().find(|l| l.short_code == short_code).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().expect("links lock poisoned");
        Ok(links.iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        long_url: &str,
    ) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().expect("links lock poisoned");
        Ok(links
            .iter()
            .find(|l| l.owner_id == owner_id && l.long_url == long_url)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<LinkTotals>, AppError> {
        let links = self.links.lock().expect("links lock poisoned");
        let buckets = self.buckets.lock().expect("buckets lock poisoned");

        let mut totals: Vec<LinkTotals> = links
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .map(|l| LinkTotals {
                link_id: l.id,
                short_code: l.short_code.clone(),
                long_url: l.long_url.clone(),
                created_at: l.created_at,
                total_visits: buckets
                    .values()
                    .filter(|b| b.link_id == l.id)
                    .map(|b| b.visit_count)
                    .sum(),
            })
            .collect();

        totals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(totals)
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut links = self.links.lock().expect("links lock poisoned");

        let before = links.len();
        links.retain(|l| !(l.id == id && l.owner_id == owner_id));
        if links.len() == before {
            return Ok(false);
        }

        // Cascade, mirroring the ON DELETE CASCADE foreign key.
        let mut buckets = self.buckets.lock().expect("buckets lock poisoned");
        buckets.retain(|_, b| b.link_id != id);

        Ok(true)
    }
}

#[async_trait]
impl MetricsRepository for MemoryStore {
    async fn record_visit(
        &self,
        link_id: i64,
        bucket_start: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut buckets = self.buckets.lock().expect("buckets lock poisoned");

        match buckets.get_mut(&(link_id, bucket_start)) {
            Some(bucket) => {
                bucket.visit_count += 1;
                bucket.unique_visitor_estimate = estimate_unique_visitors(bucket.visit_count);
            }
            None => {
                let bucket = MetricBucket {
                    id: self.next_id(),
                    link_id,
                    bucket_start,
                    visit_count: 1,
                    unique_visitor_estimate: estimate_unique_visitors(1),
                    created_at: Utc::now(),
                };
                buckets.insert((link_id, bucket_start), bucket);
            }
        }

        Ok(())
    }

    async fn list_buckets(
        &self,
        link_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricBucket>, AppError> {
        let buckets = self.buckets.lock().expect("buckets lock poisoned");

        let mut matching: Vec<MetricBucket> = buckets
            .values()
            .filter(|b| b.link_id == link_id)
            .filter(|b| from.is_none_or(|f| b.bucket_start >= f))
            .filter(|b| to.is_none_or(|t| b.bucket_start < t))
            .cloned()
            .collect();

        matching.sort_by_key(|b| b.bucket_start);
        Ok(matching)
    }

    async fn total_visits(&self, link_id: i64) -> Result<i64, AppError> {
        let buckets = self.buckets.lock().expect("buckets lock poisoned");
        Ok(buckets
            .values()
            .filter(|b| b.link_id == link_id)
            .map(|b| b.visit_count)
            .sum())
    }
}

#[async_trait]
impl OwnerRepository for MemoryStore {
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Owner>, AppError> {
        let owners = self.owners.lock().expect("owners lock poisoned");
        Ok(owners
            .iter()
            .find(|r| r.token_hash == token_hash && !r.owner.revoked)
            .map(|r| r.owner.clone()))
    }

    async fn register(&self, name: &str, token_hash: &str) -> Result<Owner, AppError> {
        let mut owners = self.owners.lock().expect("owners lock poisoned");

        if owners.iter().any(|r| r.token_hash == token_hash) {
            return Err(AppError::store("token hash already registered", json!({})));
        }

        let owner = Owner {
            id: self.next_id(),
            name: name.to_string(),
            revoked: false,
            created_at: Utc::now(),
            last_used_at: None,
        };
        owners.push(OwnerRecord {
            owner: owner.clone(),
            token_hash: token_hash.to_string(),
        });

        Ok(owner)
    }

    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut owners = self.owners.lock().expect("owners lock poisoned");
        if let Some(record) = owners.iter_mut().find(|r| r.token_hash == token_hash) {
            record.owner.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn revoke(&self, name: &str) -> Result<bool, AppError> {
        let mut owners = self.owners.lock().expect("owners lock poisoned");

        let mut revoked_any = false;
        for record in owners.iter_mut().filter(|r| r.owner.name == name) {
            if !record.owner.revoked {
                record.owner.revoked = true;
                revoked_any = true;
            }
        }

        Ok(revoked_any)
    }

    async fn list(&self) -> Result<Vec<Owner>, AppError> {
        let owners = self.owners.lock().expect("owners lock poisoned");
        let mut all: Vec<Owner> = owners.iter().map(|r| r.owner.clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
