//! Integration tests for cache queries.
//!
//! Tests cover:
//! - Relative and explicit windows
//! - Instance and metric filters
//! - NOTOK responses for unknown components and missing windows
//! - The protobuf query shape

use axum::http::StatusCode;
use prost::Message;
use serde_json::{json, Value};
use shared::models::MetricSample;
use shared::wire::{self, MetricInterval, MetricRequest, MetricResponse};

use super::common::{post_json, post_protobuf, test_app};

const T0: i64 = 1_700_000_040;

fn seed(state: &api::AppState) {
    state
        .cache()
        .add_metrics(vec![
            MetricSample::new("bolt1", "i1", "exe-count", 5.0).with_timestamp(T0),
            MetricSample::new("bolt1", "i1", "exe-count", 3.0).with_timestamp(T0 + 1),
            MetricSample::new("bolt1", "i1", "exe-count", 1.0).with_timestamp(T0 + 60),
            MetricSample::new("bolt1", "i2", "exe-count", 9.0).with_timestamp(T0),
            MetricSample::new("bolt1", "i2", "latency", 4.0).with_timestamp(T0),
        ])
        .unwrap();
}

#[tokio::test]
async fn test_explicit_window_returns_overlapping_buckets() {
    let (app, state) = test_app();
    seed(&state);

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "component_name": "bolt1",
            "window": {"explicit": {"start": T0, "end": T0 + 119}}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"]["code"], "OK");
    assert_eq!(response["interval"], 119);

    let buckets = response["series"]["i1"]["exe-count"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["value"], 8.0);
    assert_eq!(buckets[1]["value"], 1.0);
    assert!(buckets[0]["start_time"].as_i64() < buckets[1]["start_time"].as_i64());
}

#[tokio::test]
async fn test_filters_restrict_instances_and_metrics() {
    let (app, state) = test_app();
    seed(&state);

    let (_, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "component_name": "bolt1",
            "instance_ids": ["i2"],
            "metric_names": ["latency"],
            "window": {"explicit": {"start": T0, "end": T0 + 60}}
        }),
    )
    .await;

    let series = response["series"].as_object().unwrap();
    assert_eq!(series.len(), 1);
    let i2 = series["i2"].as_object().unwrap();
    assert_eq!(i2.len(), 1);
    assert_eq!(i2["latency"][0]["value"], 4.0);
}

#[tokio::test]
async fn test_unknown_component_is_not_ok() {
    let (app, state) = test_app();
    seed(&state);

    let (status, response) = post_json(
        app,
        "/api/v1/query",
        json!({"component_name": "unknown-component", "window": {"relative": 60}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"]["code"], "NOTOK");
    assert_eq!(
        response["status"]["message"],
        "Metrics not available for component `unknown-component`"
    );
    assert!(response["series"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_window_is_not_ok() {
    let (app, state) = test_app();
    seed(&state);

    let (status, response) =
        post_json(app, "/api/v1/query", json!({"component_name": "bolt1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"]["code"], "NOTOK");
    assert_eq!(
        response["status"]["message"],
        "No interval or explicit interval set"
    );
}

#[tokio::test]
async fn test_protobuf_query_matches_json_query() {
    let (app, state) = test_app();
    seed(&state);

    let request = MetricRequest {
        component_name: "bolt1".to_string(),
        metric: vec!["exe-count".to_string()],
        explicit_interval: Some(MetricInterval {
            start: T0,
            end: T0 + 119,
        }),
        ..Default::default()
    };
    let (status, body) = post_protobuf(app.clone(), "/api/v1/query", request.encode_to_vec()).await;
    assert_eq!(status, StatusCode::OK);

    let response = MetricResponse::decode(body).unwrap();
    assert_eq!(response.status.as_ref().unwrap().status(), wire::StatusCode::Ok);
    assert_eq!(response.interval, 119);

    let ids: Vec<&str> = response.metric.iter().map(|t| t.instance_id.as_str()).collect();
    assert_eq!(ids, vec!["i1", "i2"]);

    let (_, json_response): (_, Value) = post_json(
        app,
        "/api/v1/query",
        json!({
            "component_name": "bolt1",
            "metric_names": ["exe-count"],
            "window": {"explicit": {"start": T0, "end": T0 + 119}}
        }),
    )
    .await;

    for task in &response.metric {
        for metric in &task.metric {
            let json_buckets = json_response["series"][&task.instance_id][&metric.name]
                .as_array()
                .unwrap();
            assert_eq!(json_buckets.len(), metric.interval_values.len());
            for (json_bucket, value) in json_buckets.iter().zip(&metric.interval_values) {
                assert_eq!(json_bucket["start_time"], value.start);
                assert_eq!(json_bucket["value"], value.value);
                assert_eq!(json_bucket["sample_count"], value.sample_count);
            }
        }
    }
}

#[tokio::test]
async fn test_protobuf_query_unknown_component() {
    let (app, _state) = test_app();

    let request = MetricRequest {
        component_name: "nope".to_string(),
        interval: Some(60),
        ..Default::default()
    };
    let (status, body) = post_protobuf(app, "/api/v1/query", request.encode_to_vec()).await;
    assert_eq!(status, StatusCode::OK);

    let response = MetricResponse::decode(body).unwrap();
    let status = response.status.unwrap();
    assert_eq!(status.status(), wire::StatusCode::Notok);
    assert!(status.message.contains("nope"));
    assert!(response.metric.is_empty());
}
