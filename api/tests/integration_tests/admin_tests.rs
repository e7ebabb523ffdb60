//! Integration tests for the purge and dump endpoints.

use axum::http::StatusCode;
use serde_json::json;
use shared::models::MetricSample;

use super::common::{get_text, post_json, test_app};

#[tokio::test]
async fn test_purge_drops_expired_buckets_but_keeps_series() {
    let (app, state) = test_app();
    state
        .cache()
        .add_metrics(vec![
            MetricSample::new("bolt1", "i1", "exe-count", 1.0).with_timestamp(1_000_020),
        ])
        .unwrap();

    let (status, response) = post_json(app.clone(), "/api/v1/purge", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["purged"], true);
    assert_eq!(response["evicted"], 1);

    let (_, response) = post_json(
        app,
        "/api/v1/query",
        json!({
            "component_name": "bolt1",
            "window": {"explicit": {"start": 1_000_000, "end": 1_000_060}}
        }),
    )
    .await;
    assert_eq!(response["status"]["code"], "OK");
    assert!(response["series"]["i1"]["exe-count"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_dump_lists_components_in_order() {
    let (app, state) = test_app();
    state
        .cache()
        .add_metrics(vec![
            MetricSample::new("spout", "i1", "exe-count", 1.0),
            MetricSample::new("bolt1", "i1", "latency", 2.0),
        ])
        .unwrap();

    let (status, dump) = get_text(app, "/api/v1/dump").await;
    assert_eq!(status, StatusCode::OK);

    let bolt = dump.find("bolt1 #>").unwrap();
    let spout = dump.find("spout #>").unwrap();
    assert!(bolt < spout);
    assert!(dump.contains("latency => AVG"));
}
