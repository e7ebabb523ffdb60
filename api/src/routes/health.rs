//! Health check endpoint.
//!
//! Reports liveness plus a little cache context for load balancers and operators.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "healthy", or "degraded" if the cache cannot be read.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Number of components held in the cache.
    pub components: usize,
    /// Retention window in seconds.
    pub max_interval: u64,
    /// Bucket width in seconds.
    pub interval: u64,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache();
    let config = cache.config();

    let (status, components) = match cache.component_names() {
        Ok(names) => ("healthy", names.len()),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not read the cache");
            ("degraded", 0)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        service: "metricscache-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components,
        max_interval: config.max_interval,
        interval: config.interval,
    })
}
