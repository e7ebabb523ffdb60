//! Integration tests for metric ingestion.
//!
//! Tests cover:
//! - Single and batch JSON ingestion
//! - Protobuf `PublishMetrics` ingestion
//! - Rejection of empty batches and invalid samples
//! - Out-of-range timestamps leaving the component usable

use axum::http::StatusCode;
use prost::Message;
use serde_json::{json, Value};
use shared::models::MetricSample;
use shared::wire::conversions::samples_to_publish;

use super::common::{get, post_json, post_protobuf, test_app};

/// Bucket-aligned for the default 60 second interval.
const T0: i64 = 1_700_000_040;

fn explicit_query(component: &str) -> Value {
    json!({
        "component_name": component,
        "window": {"explicit": {"start": T0, "end": T0 + 60}}
    })
}

#[tokio::test]
async fn test_ingest_single_metric() {
    let (app, _state) = test_app();

    let metric = json!({
        "component_name": "bolt1",
        "instance_id": "container_1_bolt1_1",
        "metric_name": "exe-count",
        "value": 5.0,
        "timestamp": T0
    });

    let (status, response) = post_json(app.clone(), "/api/v1/metrics", metric).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 1);

    let (status, response) = post_json(app, "/api/v1/query", explicit_query("bolt1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"]["code"], "OK");

    let buckets = response["series"]["container_1_bolt1_1"]["exe-count"]
        .as_array()
        .unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["start_time"], T0);
    assert_eq!(buckets[0]["end_time"], T0 + 60);
    assert_eq!(buckets[0]["value"], 5.0);
}

#[tokio::test]
async fn test_ingest_batch_aggregates_per_policy() {
    let (app, _state) = test_app();

    let metrics = json!([
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "exe-count", "value": 5.0, "timestamp": T0},
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "exe-count", "value": 3.0, "timestamp": T0 + 1},
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "latency", "value": 10.0, "timestamp": T0},
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "latency", "value": 20.0, "timestamp": T0 + 2},
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "latency", "value": 30.0, "timestamp": T0 + 3},
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "queue-size", "value": 7.0, "timestamp": T0},
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "queue-size", "value": 4.0, "timestamp": T0 + 4}
    ]);

    let (status, response) = post_json(app.clone(), "/api/v1/metrics", metrics).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 7);

    let (_, response) = post_json(app, "/api/v1/query", explicit_query("bolt1")).await;
    let series = &response["series"]["i1"];

    assert_eq!(series["exe-count"][0]["value"], 8.0);
    assert_eq!(series["exe-count"][0]["sample_count"], 2);
    assert_eq!(series["latency"][0]["value"], 20.0);
    assert_eq!(series["latency"][0]["sample_count"], 3);
    assert_eq!(series["queue-size"][0]["value"], 4.0);
}

#[tokio::test]
async fn test_ingest_protobuf_batch() {
    let (app, _state) = test_app();

    let publish = samples_to_publish(&[
        MetricSample::new("spout", "i1", "exe-count", 2.0).with_timestamp(T0),
        MetricSample::new("spout", "i2", "exe-count", 4.0).with_timestamp(T0),
    ]);

    let (status, body) = post_protobuf(app.clone(), "/api/v1/metrics", publish.encode_to_vec()).await;
    assert_eq!(status, StatusCode::CREATED);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["accepted"], 2);

    let (_, response) = post_json(app.clone(), "/api/v1/query", explicit_query("spout")).await;
    assert_eq!(response["series"]["i1"]["exe-count"][0]["value"], 2.0);
    assert_eq!(response["series"]["i2"]["exe-count"][0]["value"], 4.0);

    let (_, health) = get(app, "/health").await;
    assert_eq!(health["components"], 1);
}

#[tokio::test]
async fn test_ingest_without_timestamp_uses_now() {
    let (app, _state) = test_app();

    let metric = json!({
        "component_name": "bolt1",
        "instance_id": "i1",
        "metric_name": "exe-count",
        "value": 1.0
    });
    let (status, _) = post_json(app.clone(), "/api/v1/metrics", metric).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, response) = post_json(
        app,
        "/api/v1/query",
        json!({"component_name": "bolt1", "window": {"relative": 120}}),
    )
    .await;
    assert_eq!(
        response["series"]["i1"]["exe-count"].as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_ingest_empty_batch_rejected() {
    let (app, _state) = test_app();

    let (status, response) = post_json(app, "/api/v1/metrics", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "empty_batch");
}

#[tokio::test]
async fn test_ingest_invalid_sample_rejected() {
    let (app, _state) = test_app();

    let metric = json!({
        "component_name": "",
        "instance_id": "i1",
        "metric_name": "exe-count",
        "value": 1.0
    });
    let (status, response) = post_json(app.clone(), "/api/v1/metrics", metric).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "validation_error");

    // Nothing from a rejected batch is stored.
    let (_, health) = get(app, "/health").await;
    assert_eq!(health["components"], 0);
}

#[tokio::test]
async fn test_ingest_out_of_range_timestamp_rejected() {
    let (app, _state) = test_app();

    let (status, response) = post_json(app.clone(), "/api/v1/metrics", json!([
        {"component_name": "bolt1", "instance_id": "i1", "metric_name": "exe-count", "value": 5.0, "timestamp": T0}
    ]))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 1);

    for timestamp in [i64::MAX, i64::MIN, -1] {
        let metric = json!({
            "component_name": "bolt1",
            "instance_id": "i1",
            "metric_name": "exe-count",
            "value": 1.0,
            "timestamp": timestamp
        });
        let (status, response) = post_json(app.clone(), "/api/v1/metrics", metric).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "validation_error");
    }

    let publish = samples_to_publish(&[
        MetricSample::new("bolt1", "i1", "exe-count", 1.0).with_timestamp(i64::MAX),
    ]);
    let (status, _) = post_protobuf(app.clone(), "/api/v1/metrics", publish.encode_to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The component still accepts and serves ordinary samples.
    let metric = json!({
        "component_name": "bolt1",
        "instance_id": "i1",
        "metric_name": "exe-count",
        "value": 3.0,
        "timestamp": T0 + 1
    });
    let (status, _) = post_json(app.clone(), "/api/v1/metrics", metric).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = post_json(app, "/api/v1/query", explicit_query("bolt1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"]["code"], "OK");
    assert_eq!(response["series"]["i1"]["exe-count"][0]["value"], 8.0);
    assert_eq!(response["series"]["i1"]["exe-count"][0]["sample_count"], 2);
}

#[tokio::test]
async fn test_ingest_malformed_json_rejected() {
    let (app, _state) = test_app();

    let (status, response) = post_json(app, "/api/v1/metrics", json!({"value": 1.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "decode_error");
}
