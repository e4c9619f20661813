//! Counter semantics of the metrics pipeline: idempotent buckets, hour
//! rollover, and no lost updates under concurrent writers.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use snaplink::application::services::MetricsService;
use snaplink::domain::entities::bucket_start_for;
use snaplink::domain::repositories::MetricsRepository;
use snaplink::infrastructure::persistence::MemoryStore;

#[tokio::test]
async fn test_repeated_visits_accumulate_in_one_bucket() {
    let store = Arc::new(MemoryStore::new());
    let service = MetricsService::new(store.clone());

    let hour = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    for _ in 0..5 {
        service.bump(1, hour).await.unwrap();
    }

    let buckets = store.list_buckets(1, None, None).await.unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].visit_count, 5);
    assert_eq!(buckets[0].bucket_start, hour);
}

#[tokio::test]
async fn test_visits_across_hour_boundary_split_buckets() {
    let store = Arc::new(MemoryStore::new());
    let service = MetricsService::new(store.clone());

    let before = Utc.with_ymd_and_hms(2024, 1, 1, 10, 59, 59).unwrap();
    let after = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 1).unwrap();

    service.bump(1, bucket_start_for(before)).await.unwrap();
    service.bump(1, bucket_start_for(after)).await.unwrap();

    let buckets = store.list_buckets(1, None, None).await.unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(
        buckets[0].bucket_start,
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(
        buckets[1].bucket_start,
        Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap()
    );
    assert_eq!(buckets[0].visit_count, 1);
    assert_eq!(buckets[1].visit_count, 1);
}

#[tokio::test]
async fn test_buckets_are_per_link() {
    let store = Arc::new(MemoryStore::new());
    let service = MetricsService::new(store.clone());

    let hour = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    service.bump(1, hour).await.unwrap();
    service.bump(2, hour).await.unwrap();
    service.bump(2, hour).await.unwrap();

    assert_eq!(store.total_visits(1).await.unwrap(), 1);
    assert_eq!(store.total_visits(2).await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_visits_are_all_counted() {
    const WRITERS: usize = 64;

    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(MetricsService::new(store.clone()));

    let hour = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

    let mut handles = Vec::with_capacity(WRITERS);
    for _ in 0..WRITERS {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.bump(7, hour).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Every concurrent writer counted, exactly one row.
    let buckets = store.list_buckets(7, None, None).await.unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].visit_count, WRITERS as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_visits_across_two_buckets() {
    const WRITERS_PER_BUCKET: usize = 32;

    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(MetricsService::new(store.clone()));

    let h10 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let h11 = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();

    let mut handles = Vec::new();
    for i in 0..WRITERS_PER_BUCKET * 2 {
        let service = Arc::clone(&service);
        let hour = if i % 2 == 0 { h10 } else { h11 };
        handles.push(tokio::spawn(async move {
            service.bump(7, hour).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let buckets = store.list_buckets(7, None, None).await.unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].visit_count, WRITERS_PER_BUCKET as i64);
    assert_eq!(buckets[1].visit_count, WRITERS_PER_BUCKET as i64);
}

#[tokio::test]
async fn test_unique_visitor_estimate_tracks_visit_count() {
    let store = Arc::new(MemoryStore::new());
    let service = MetricsService::new(store.clone());

    let hour = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    for _ in 0..10 {
        service.bump(1, hour).await.unwrap();
    }

    let buckets = store.list_buckets(1, None, None).await.unwrap();
    assert_eq!(buckets[0].visit_count, 10);
    assert_eq!(buckets[0].unique_visitor_estimate, 7);
}
