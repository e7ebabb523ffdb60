//! Operator endpoints: on-demand purge and a text dump of the cache.

use super::{reject, Rejection};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Response for a purge.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResponse {
    /// Always true when the purge ran.
    pub purged: bool,
    /// Number of buckets evicted.
    pub evicted: usize,
}

/// Creates the admin routes.
pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/purge", post(purge))
        .route("/api/v1/dump", get(dump))
        .with_state(state)
}

async fn purge(State(state): State<AppState>) -> Result<Json<PurgeResponse>, Rejection> {
    let evicted = state.cache().purge().map_err(|e| {
        reject(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
    })?;

    Ok(Json(PurgeResponse {
        purged: true,
        evicted,
    }))
}

async fn dump(State(state): State<AppState>) -> Result<String, Rejection> {
    state.cache().dump().map_err(|e| {
        reject(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
    })
}
