//! Integration tests for health check and general API functionality.
//!
//! Tests cover:
//! - Health check endpoint
//! - Empty cache behavior

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, get_text, post_json, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "metricscache-api");
    assert_eq!(response["components"], 0);
}

#[tokio::test]
async fn test_empty_cache_returns_not_ok_and_empty_dump() {
    let (app, _state) = test_app();

    let (status, response) = post_json(
        app.clone(),
        "/api/v1/query",
        json!({"component_name": "bolt1", "window": {"relative": 60}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"]["code"], "NOTOK");

    let (status, dump) = get_text(app, "/api/v1/dump").await;
    assert_eq!(status, StatusCode::OK);
    assert!(dump.is_empty());
}
