//! Metrics ingestion endpoint.
//!
//! Accepts one datum or a batch as JSON, or a `PublishMetrics` protobuf
//! message when the request carries `Content-Type: application/x-protobuf`.

use super::{is_protobuf, reject, Rejection};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use prost::Message;
use serde::{Deserialize, Serialize};
use shared::models::MetricSample;
use shared::wire::{conversions, PublishMetrics};

/// Request for metric ingestion.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MetricIngestRequest {
    /// One datum.
    Single(MetricDatumRequest),
    /// Several data.
    Batch(Vec<MetricDatumRequest>),
}

/// A single reported value.
#[derive(Debug, Deserialize)]
pub struct MetricDatumRequest {
    /// Component the instance belongs to.
    pub component_name: String,
    /// Reporting instance.
    pub instance_id: String,
    /// Metric name.
    pub metric_name: String,
    /// Measured value.
    pub value: f64,
    /// Observation time in epoch seconds; ingestion time when absent.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl MetricDatumRequest {
    fn into_sample(self, now: i64) -> MetricSample {
        MetricSample {
            component_name: self.component_name,
            instance_id: self.instance_id,
            metric_name: self.metric_name,
            value: self.value,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

/// Response for metric ingestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricIngestResponse {
    /// Number of samples accepted.
    pub accepted: usize,
    /// Summary.
    pub message: String,
}

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/metrics", post(ingest_metrics))
        .with_state(state)
}

fn decode_samples(headers: &HeaderMap, body: &Bytes, now: i64) -> Result<Vec<MetricSample>, Rejection> {
    if is_protobuf(headers) {
        let publish = PublishMetrics::decode(body.as_ref()).map_err(|e| {
            tracing::error!(error = %e, "Failed to decode protobuf metrics");
            reject(
                StatusCode::BAD_REQUEST,
                "decode_error",
                format!("Failed to decode protobuf: {e}"),
            )
        })?;
        return Ok(conversions::publish_to_samples(&publish, now));
    }

    let request: MetricIngestRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse JSON metrics");
        reject(
            StatusCode::BAD_REQUEST,
            "decode_error",
            format!("Failed to parse JSON: {e}"),
        )
    })?;

    let data = match request {
        MetricIngestRequest::Single(datum) => vec![datum],
        MetricIngestRequest::Batch(data) => data,
    };
    Ok(data.into_iter().map(|datum| datum.into_sample(now)).collect())
}

async fn ingest_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<MetricIngestResponse>), Rejection> {
    let samples = decode_samples(&headers, &body, Utc::now().timestamp())?;

    if samples.is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "empty_batch",
            "At least one metric is required",
        ));
    }

    for sample in &samples {
        sample.validate_sample().map_err(|e| {
            reject(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!(
                    "Invalid metric {}/{}/{}: {e}",
                    sample.component_name, sample.instance_id, sample.metric_name
                ),
            )
        })?;
    }

    let count = samples.len();
    state.cache().add_metrics(samples).map_err(|e| {
        reject(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
    })?;

    tracing::debug!(count, "Ingested metrics");

    Ok((
        StatusCode::CREATED,
        Json(MetricIngestResponse {
            accepted: count,
            message: format!("Ingested {count} metric(s)"),
        }),
    ))
}
