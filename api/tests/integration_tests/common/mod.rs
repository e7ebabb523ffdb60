//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup and HTTP request helpers.

use api::{create_router, AppState};
use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::wire::CONTENT_TYPE_PROTOBUF;

/// Aggregation table used by every test app.
pub const METRICS_TYPES: [(&str, &str); 3] = [
    ("exe-count", "SUM"),
    ("latency", "AVG"),
    ("queue-size", "LAST"),
];

/// Creates a test router with a fresh cache.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_metrics_types(METRICS_TYPES).unwrap();
    let router = create_router(state.clone());
    (router, state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, body_bytes)
}

/// Helper to make a POST request with JSON body.
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, body_bytes) = send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await;

    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Helper to make a POST request with a protobuf body.
///
/// # Returns
///
/// A tuple containing the response status code and the raw response body.
pub async fn post_protobuf(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, Bytes) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_PROTOBUF)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Helper to make a GET request.
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body_bytes) = get_text(app, uri).await;
    let json: Value = serde_json::from_str(&body_bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Helper to make a GET request and read the body as text.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let (status, body_bytes) = send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}
