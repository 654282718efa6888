//! HTTP-level tests against the full router.
//!
//! The pool connects lazily to an address nothing listens on, so the query
//! path exercises the store-failure contract without a running PostgreSQL.

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use custfeed_server::{create_router, database, AppState, BroadcastHub, ServerConfig};
use serde_json::json;

fn test_state() -> AppState {
    let config = ServerConfig {
        database_url: "postgres://postgres@127.0.0.1:1/postgres".to_string(),
        cors_origin: HeaderValue::from_static("http://app.example.com"),
        ..ServerConfig::default()
    };
    let pool = database::connect_pool(&config).expect("lazy pool");
    let hub = Arc::new(BroadcastHub::new(
        config.max_stream_clients,
        config.stream_client_buffer,
    ));
    AppState::new(pool, hub, config)
}

#[tokio::test]
async fn store_failure_is_masked_with_generic_500() {
    let server = TestServer::new(create_router(test_state())).unwrap();

    let response = server.get("/api/customers").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({
        "error": "Database error. Please try again later."
    }));
}

#[tokio::test]
async fn health_reports_degraded_store() {
    let server = TestServer::new(create_router(test_state())).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store_connected"], false);
    assert_eq!(body["active_streams"], 0);
}

#[tokio::test]
async fn cors_allows_only_the_configured_origin() {
    let server = TestServer::new(create_router(test_state())).unwrap();

    let allowed = server
        .get("/health")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("http://app.example.com"),
        )
        .await;
    allowed.assert_status_ok();
    assert_eq!(
        allowed.maybe_header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(HeaderValue::from_static("http://app.example.com"))
    );

    let other = server
        .get("/health")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("http://other.example.com"),
        )
        .await;
    // Unlisted origins get no allow header back.
    assert!(other
        .maybe_header(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
