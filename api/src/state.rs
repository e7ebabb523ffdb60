//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::config::{CacheConfig, SinksConfig};
use shared::storage::{CacheError, MetricsCache};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Cloning is cheap; every clone shares the same cache.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<MetricsCache>,
}

impl AppState {
    /// Creates a new application state around an existing cache.
    #[must_use]
    pub fn new(cache: Arc<MetricsCache>) -> Self {
        Self { cache }
    }

    /// Creates a new application state with a cache built from `config` and `sinks`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be configured.
    pub fn from_config(config: CacheConfig, sinks: &SinksConfig) -> Result<Self, CacheError> {
        Ok(Self::new(Arc::new(MetricsCache::new(config, sinks)?)))
    }

    /// Creates a state with default windows and the given aggregation table.
    ///
    /// This is useful for development and testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be configured.
    pub fn with_metrics_types<I, K, V>(metrics_types: I) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_config(
            CacheConfig::default(),
            &SinksConfig::for_cache(metrics_types),
        )
    }

    /// Returns a reference to the metrics cache.
    #[must_use]
    pub fn cache(&self) -> &MetricsCache {
        self.cache.as_ref()
    }

    /// Returns a shared handle to the metrics cache.
    #[must_use]
    pub fn cache_handle(&self) -> Arc<MetricsCache> {
        Arc::clone(&self.cache)
    }
}
