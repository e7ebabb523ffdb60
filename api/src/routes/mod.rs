//! API route definitions.
//!
//! This module organizes all HTTP routes for the Metricscache API server.

mod admin;
mod health;
mod metrics;
mod query;

pub use admin::admin_routes;
pub use health::health_routes;
pub use metrics::metrics_routes;
pub use query::query_routes;

use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::wire::CONTENT_TYPE_PROTOBUF;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error kind.
    pub error: String,
    /// Human-readable explanation.
    pub message: String,
}

/// Rejection returned by handlers.
pub(crate) type Rejection = (StatusCode, Json<ApiError>);

pub(crate) fn reject(status: StatusCode, error: &str, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(ApiError {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

/// Determines if the request is protobuf based on Content-Type header.
pub(crate) fn is_protobuf(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(CONTENT_TYPE_PROTOBUF))
}
