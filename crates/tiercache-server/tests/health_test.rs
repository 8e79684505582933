mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use helpers::{client, client_with, default_secrets, test_registry};
use tiercache_server::{AppState, HealthResponse};

#[tokio::test]
async fn health_check_returns_200() {
    let response = client().get("/health").await;

    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn health_check_returns_json() {
    let response = client().get("/health").await;

    let content_type = response.header("content-type").unwrap();
    assert!(content_type.contains("application/json"));
}

#[tokio::test]
async fn health_check_body_contains_status_up() {
    let response = client().get("/health").await;

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "UP");
    assert_eq!(health.cache.tiers, 4);
    assert!(health.cache.degraded.is_empty());
}

#[tokio::test]
async fn health_check_reports_degraded_tier() {
    let state = AppState::new(
        Arc::new(test_registry(true, default_secrets())),
        Duration::from_secs(5),
    );

    let response = client_with(state).get("/health").await;

    response.assert_status(StatusCode::OK);
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "DEGRADED");
    assert_eq!(health.cache.tiers, 5);
    assert_eq!(health.cache.degraded, vec!["unreachable"]);
}

#[tokio::test]
async fn health_check_does_not_touch_counters() {
    let registry = Arc::new(test_registry(false, default_secrets()));
    let state = AppState::new(Arc::clone(&registry), Duration::from_secs(5));

    client_with(state).get("/health").await;

    let stats = registry.stats_all().await;
    assert_eq!(stats.totals.hits + stats.totals.misses, 0);
}
