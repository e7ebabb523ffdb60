//! Metricscache API Server
//!
//! This crate provides the HTTP server in front of the in-memory metrics
//! cache. Emitters publish samples, clients query time-bucketed series, and
//! a background task purges buckets that fell out of the retention window.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - Ingestion of JSON or protobuf metric batches
//! - Queries in the internal JSON shape or the protobuf wire shape
//! - Operator endpoints for purge and dump
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod purge;
mod routes;
mod state;

pub use config::{Config, DEFAULT_SINKS_CONFIG};
pub use purge::PurgeTask;
pub use routes::ApiError;
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use shared::storage::MetricsCache;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the Metricscache API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The metrics sinks file cannot be loaded
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Metricscache API server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The metrics sinks file cannot be loaded
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        sinks_config = %config.sinks_config.display(),
        "Metricscache API server starting"
    );

    let cache = MetricsCache::from_sinks_file(config.cache_config(), &config.sinks_config)
        .with_context(|| {
            format!(
                "Failed to create metrics cache from {}",
                config.sinks_config.display()
            )
        })?;
    let state = AppState::new(Arc::new(cache));

    let purge_task = Arc::new(PurgeTask::new(state.cache_handle(), config.purge_period()));
    let purge_handle = tokio::spawn(purge_task.run());

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_handle.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::metrics_routes(state.clone()))
        .merge(routes::query_routes(state.clone()))
        .merge(routes::admin_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
