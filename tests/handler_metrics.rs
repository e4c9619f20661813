//! HTTP-level tests for metrics, stats, and deletion endpoints.

mod common;

use axum_test::TestServer;
use chrono::{DateTime, TimeDelta, Utc};
use snaplink::domain::entities::{bucket_start_for, day_start_for};
use snaplink::domain::repositories::MetricsRepository;

fn parse_ts(value: &serde_json::Value) -> DateTime<Utc> {
    serde_json::from_value(value.clone()).expect("timestamp field")
}

#[tokio::test]
async fn test_metrics_returns_ordered_buckets() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let owner_id = common::seed_owner(&store, "ci", "token-1").await;
    let link = common::seed_link(&store, "abc123", "https://example.com/", owner_id).await;

    let h10 = day_start_for(Utc::now()) - TimeDelta::days(1) + TimeDelta::hours(10);
    let h8 = h10 - TimeDelta::hours(2);

    // Insert later hour first; the endpoint must still return ascending.
    store.record_visit(link.id, h10).await.unwrap();
    store.record_visit(link.id, h8).await.unwrap();
    store.record_visit(link.id, h8).await.unwrap();

    let body: serde_json::Value = server
        .get(&format!("/api/links/{}/metrics", link.id))
        .add_header("Authorization", common::bearer("token-1"))
        .await
        .json();

    assert_eq!(body["link_id"], link.id);
    assert_eq!(body["short_code"], "abc123");

    let buckets = body["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(parse_ts(&buckets[0]["bucket_start"]), h8);
    assert_eq!(buckets[0]["visit_count"], 2);
    assert_eq!(parse_ts(&buckets[1]["bucket_start"]), h10);
    assert_eq!(buckets[1]["visit_count"], 1);
}

#[tokio::test]
async fn test_metrics_scoped_to_owner() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let alice_id = common::seed_owner(&store, "alice", "token-a").await;
    common::seed_owner(&store, "bob", "token-b").await;
    let link = common::seed_link(&store, "abc123", "https://example.com/", alice_id).await;

    // Bob cannot see alice's metrics; the link reads as absent.
    let response = server
        .get(&format!("/api/links/{}/metrics", link.id))
        .add_header("Authorization", common::bearer("token-b"))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_stats_today_window() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let owner_id = common::seed_owner(&store, "ci", "token-1").await;
    let link = common::seed_link(&store, "abc123", "https://example.com/", owner_id).await;

    let this_hour = bucket_start_for(Utc::now());
    for _ in 0..3 {
        store.record_visit(link.id, this_hour).await.unwrap();
    }

    let body: serde_json::Value = server
        .get(&format!("/api/links/{}/stats", link.id))
        .add_query_param("window", "today")
        .add_header("Authorization", common::bearer("token-1"))
        .await
        .json();

    assert_eq!(body["window"], "today");
    assert_eq!(body["resolution"], "hourly");

    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["visits"], 3);
}

#[tokio::test]
async fn test_stats_defaults_to_seven_days_daily() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let owner_id = common::seed_owner(&store, "ci", "token-1").await;
    let link = common::seed_link(&store, "abc123", "https://example.com/", owner_id).await;

    let yesterday = day_start_for(Utc::now()) - TimeDelta::days(1);
    store
        .record_visit(link.id, yesterday + TimeDelta::hours(3))
        .await
        .unwrap();
    store
        .record_visit(link.id, yesterday + TimeDelta::hours(15))
        .await
        .unwrap();

    let body: serde_json::Value = server
        .get(&format!("/api/links/{}/stats", link.id))
        .add_header("Authorization", common::bearer("token-1"))
        .await
        .json();

    assert_eq!(body["window"], "7d");
    assert_eq!(body["resolution"], "daily");

    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(parse_ts(&points[0]["timestamp"]), yesterday);
    assert_eq!(points[0]["visits"], 2);
}

#[tokio::test]
async fn test_stats_rejects_unknown_window() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let owner_id = common::seed_owner(&store, "ci", "token-1").await;
    let link = common::seed_link(&store, "abc123", "https://example.com/", owner_id).await;

    let response = server
        .get(&format!("/api/links/{}/stats", link.id))
        .add_query_param("window", "14d")
        .add_header("Authorization", common::bearer("token-1"))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_delete_cascades_and_stops_redirects() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let owner_id = common::seed_owner(&store, "ci", "token-1").await;
    let link = common::seed_link(&store, "gone42", "https://example.com/", owner_id).await;

    store
        .record_visit(link.id, bucket_start_for(Utc::now()))
        .await
        .unwrap();

    let response = server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", common::bearer("token-1"))
        .await;
    assert_eq!(response.status_code(), 204);

    // Buckets cascaded with the link.
    assert!(
        store
            .list_buckets(link.id, None, None)
            .await
            .unwrap()
            .is_empty()
    );

    // Metrics now 404 rather than serving stale data.
    server
        .get(&format!("/api/links/{}/metrics", link.id))
        .add_header("Authorization", common::bearer("token-1"))
        .await
        .assert_status_not_found();

    // And the code no longer redirects.
    server.get("/gone42").await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_scoped_to_owner() {
    let (state, store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let alice_id = common::seed_owner(&store, "alice", "token-a").await;
    common::seed_owner(&store, "bob", "token-b").await;
    let link = common::seed_link(&store, "mine42", "https://example.com/", alice_id).await;

    let response = server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", common::bearer("token-b"))
        .await;

    response.assert_status_not_found();

    // Alice's link survives.
    server.get("/mine42").await.assert_status(axum::http::StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let (state, _store) = common::create_test_state();
    let server = TestServer::new(common::test_router(state)).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["cache"]["status"], "ok");
}
