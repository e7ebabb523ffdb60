//! Configuration module for the metrics cache.
//!
//! This module contains the cache window settings and the metrics sinks
//! configuration the aggregation table is read from.

pub mod cache;
pub mod sinks;

pub use cache::{CacheConfig, DEFAULT_INTERVAL_SECS, DEFAULT_MAX_INTERVAL_SECS, MAX_NINTERVALS};
pub use sinks::{SinkConfig, SinksConfig, CACHE_SINK, METRICS_TYPE_KEY};

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required sink is not configured.
    #[error("Sink '{0}' is not configured")]
    MissingSink(String),

    /// A required key is missing from a sink.
    #[error("Sink '{sink}' has no '{key}' entry")]
    MissingKey {
        /// Sink name.
        sink: String,
        /// Missing key.
        key: String,
    },

    /// A value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
