//! Cache query endpoint.
//!
//! Serves both query shapes on one route. A JSON body is a
//! `MetricCacheRequest` and gets a JSON `MetricCacheResponse`; a protobuf
//! body is a `MetricRequest` and gets a protobuf `MetricResponse`.
//!
//! A rejected query (unknown component, missing window) is still HTTP 200:
//! the NOTOK status travels in the body.

use super::{is_protobuf, reject, Rejection};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use prost::Message;
use shared::models::MetricCacheRequest;
use shared::storage::CacheError;
use shared::wire::{MetricRequest, CONTENT_TYPE_PROTOBUF};

/// Creates the query routes.
pub fn query_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/query", post(query_metrics))
        .with_state(state)
}

fn storage_error(e: &CacheError) -> Rejection {
    tracing::error!(error = %e, "Query failed");
    reject(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
}

async fn query_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Rejection> {
    if is_protobuf(&headers) {
        let request = MetricRequest::decode(body).map_err(|e| {
            tracing::error!(error = %e, "Failed to decode protobuf query");
            reject(
                StatusCode::BAD_REQUEST,
                "decode_error",
                format!("Failed to decode protobuf: {e}"),
            )
        })?;

        let response = state
            .cache()
            .query_wire(&request)
            .map_err(|e| storage_error(&e))?;

        return Ok((
            [(header::CONTENT_TYPE, CONTENT_TYPE_PROTOBUF)],
            response.encode_to_vec(),
        )
            .into_response());
    }

    let request: MetricCacheRequest = serde_json::from_slice(&body).map_err(|e| {
        reject(
            StatusCode::BAD_REQUEST,
            "decode_error",
            format!("Failed to parse JSON: {e}"),
        )
    })?;

    let response = state
        .cache()
        .query(&request)
        .map_err(|e| storage_error(&e))?;

    Ok(Json(response).into_response())
}
