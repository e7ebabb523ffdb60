//! The metrics cache coordinator.
//!
//! [`MetricsCache`] owns one [`ComponentMetrics`] per component name, routes
//! samples and queries to them, and runs purges. Component stores are created
//! lazily on the first sample and live as long as the cache.
//!
//! Queries arrive in two shapes: the internal [`MetricCacheRequest`] and the
//! protobuf [`MetricRequest`]. Both go through [`MetricsCache::query_at`].

use super::component::ComponentMetrics;
use crate::config::{CacheConfig, ConfigError, SinksConfig};
use crate::models::{
    AggregationRegistry, MetricCacheRequest, MetricCacheResponse, MetricSample,
    MISSING_WINDOW_MESSAGE,
};
use crate::wire::{conversions, MetricRequest, MetricResponse, PublishMetrics};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to acquire a lock on the cache.
    #[error("Failed to acquire lock on metrics cache")]
    LockError,

    /// The cache could not be configured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// In-memory, time-windowed metrics cache.
///
/// # Example
///
/// ```
/// use shared::config::{CacheConfig, SinksConfig};
/// use shared::models::{MetricCacheRequest, MetricSample};
/// use shared::storage::MetricsCache;
///
/// let sinks = SinksConfig::for_cache([("exe-count", "SUM")]);
/// let cache = MetricsCache::new(CacheConfig::new(60, 10), &sinks).unwrap();
///
/// cache
///     .add_metrics(vec![
///         MetricSample::new("bolt1", "i1", "exe-count", 5.0).with_timestamp(1_000),
///         MetricSample::new("bolt1", "i1", "exe-count", 3.0).with_timestamp(1_001),
///     ])
///     .unwrap();
///
/// let request = MetricCacheRequest::new("bolt1").with_explicit(1_000, 1_010);
/// let response = cache.query(&request).unwrap();
/// assert!(response.is_ok());
/// assert_eq!(response.buckets("i1", "exe-count").unwrap()[0].value, 8.0);
/// ```
#[derive(Debug)]
pub struct MetricsCache {
    config: CacheConfig,
    nintervals: usize,
    registry: AggregationRegistry,
    components: RwLock<HashMap<String, Arc<ComponentMetrics>>>,
}

impl MetricsCache {
    /// Creates a cache, reading the aggregation table from `sinks`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache config is invalid or the sinks config has
    /// no aggregation table for the cache.
    pub fn new(config: CacheConfig, sinks: &SinksConfig) -> Result<Self, CacheError> {
        let registry = AggregationRegistry::from_config(sinks.cache_metrics_type()?);
        Self::with_registry(config, registry)
    }

    /// Creates a cache, loading the sinks config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the config is invalid.
    pub fn from_sinks_file(config: CacheConfig, path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let sinks = SinksConfig::from_file(path)?;
        Self::new(config, &sinks)
    }

    /// Creates a cache with an already built registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache config is invalid.
    pub fn with_registry(
        config: CacheConfig,
        registry: AggregationRegistry,
    ) -> Result<Self, CacheError> {
        config.validate().map_err(ConfigError::Invalid)?;

        let nintervals = config.nintervals();
        tracing::info!(
            max_interval = config.max_interval,
            interval = config.interval,
            nintervals,
            metric_types = registry.len(),
            "Metrics cache created"
        );

        Ok(Self {
            config,
            nintervals,
            registry,
            components: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the cache configuration.
    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Number of buckets kept per series.
    #[must_use]
    pub fn nintervals(&self) -> usize {
        self.nintervals
    }

    /// Returns the aggregation registry.
    #[must_use]
    pub fn registry(&self) -> &AggregationRegistry {
        &self.registry
    }

    fn max_interval_secs(&self) -> i64 {
        i64::try_from(self.config.max_interval).unwrap_or(i64::MAX)
    }

    fn interval_secs(&self) -> i64 {
        i64::try_from(self.config.interval).unwrap_or(i64::MAX)
    }

    fn get_component(&self, name: &str) -> Result<Option<Arc<ComponentMetrics>>, CacheError> {
        let components = self
            .components
            .read()
            .map_err(|_| CacheError::LockError)?;
        Ok(components.get(name).cloned())
    }

    fn get_or_create_component(&self, name: &str) -> Result<Arc<ComponentMetrics>, CacheError> {
        if let Some(component) = self.get_component(name)? {
            return Ok(component);
        }

        let mut components = self
            .components
            .write()
            .map_err(|_| CacheError::LockError)?;

        // Another writer may have created it between the two locks.
        let component = components.entry(name.to_string()).or_insert_with(|| {
            tracing::info!(component = %name, "Creating component metrics");
            Arc::new(ComponentMetrics::new(
                name,
                self.nintervals,
                self.interval_secs(),
            ))
        });
        Ok(Arc::clone(component))
    }

    /// Folds a batch of samples into their buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn add_metrics<I>(&self, samples: I) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = MetricSample>,
    {
        let mut added = 0usize;
        for sample in samples {
            let component = self.get_or_create_component(&sample.component_name)?;
            let aggregation = self.registry.resolve(&sample.metric_name);
            component.add_metric_for_instance(
                &sample.instance_id,
                &sample.metric_name,
                aggregation,
                sample.value,
                sample.timestamp,
            )?;
            added += 1;
        }
        tracing::debug!(count = added, "Added metrics");
        Ok(())
    }

    /// Folds a published wire batch, stamping untimed datums with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn add_published(&self, publish: &PublishMetrics) -> Result<(), CacheError> {
        let now = Utc::now().timestamp();
        self.add_metrics(conversions::publish_to_samples(publish, now))
    }

    /// Answers a query with relative windows resolved against the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned. Invalid requests and unknown
    /// components are reported through the response status.
    pub fn query(&self, request: &MetricCacheRequest) -> Result<MetricCacheResponse, CacheError> {
        self.query_at(request, Utc::now().timestamp())
    }

    /// Answers a query with relative windows resolved against `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn query_at(
        &self,
        request: &MetricCacheRequest,
        now: i64,
    ) -> Result<MetricCacheResponse, CacheError> {
        let Some(window) = request.window else {
            tracing::error!(
                component = %request.component_name,
                "Query has neither interval nor explicit interval"
            );
            return Ok(MetricCacheResponse::not_ok(MISSING_WINDOW_MESSAGE));
        };

        let Some(component) = self.get_component(&request.component_name)? else {
            tracing::warn!(
                component = %request.component_name,
                "Metrics for component are not available"
            );
            return Ok(MetricCacheResponse::not_ok(format!(
                "Metrics not available for component `{}`",
                request.component_name
            )));
        };

        let (start, end) = window.resolve(now);
        tracing::debug!(component = %request.component_name, start, end, "Querying metrics");

        let series = component.get_metrics(
            start,
            end,
            &request.instance_ids,
            &request.metric_names,
        )?;

        let mut response = MetricCacheResponse::ok();
        response.series = series;
        response.interval = end.saturating_sub(start);
        Ok(response)
    }

    /// Answers a wire-format query.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn query_wire(&self, request: &MetricRequest) -> Result<MetricResponse, CacheError> {
        self.query_wire_at(request, Utc::now().timestamp())
    }

    /// Answers a wire-format query with relative windows resolved against `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn query_wire_at(
        &self,
        request: &MetricRequest,
        now: i64,
    ) -> Result<MetricResponse, CacheError> {
        let internal = conversions::request_from_wire(request);
        let response = self.query_at(&internal, now)?;
        Ok(conversions::response_to_wire(&response))
    }

    /// Evicts buckets older than the retention window, measured from now.
    ///
    /// Returns the number of buckets evicted.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn purge(&self) -> Result<usize, CacheError> {
        self.purge_at(Utc::now().timestamp())
    }

    /// Evicts buckets older than the retention window, measured from `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn purge_at(&self, now: i64) -> Result<usize, CacheError> {
        self.purge_before(now.saturating_sub(self.max_interval_secs()))
    }

    /// Evicts every bucket ending before `cutoff` in every component.
    ///
    /// A component whose lock is poisoned is skipped and logged; the
    /// remaining components are still purged.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned, after all healthy components
    /// have been purged.
    pub fn purge_before(&self, cutoff: i64) -> Result<usize, CacheError> {
        let components: Vec<Arc<ComponentMetrics>> = {
            let components = self
                .components
                .read()
                .map_err(|_| CacheError::LockError)?;
            components.values().cloned().collect()
        };

        let mut evicted = 0;
        let mut failed = 0;
        for component in &components {
            match component.purge(cutoff) {
                Ok(count) => evicted += count,
                Err(e) => {
                    tracing::error!(component = %component.name(), error = %e, "Failed to purge component");
                    failed += 1;
                }
            }
        }

        tracing::info!(
            cutoff,
            components = components.len(),
            failed,
            evicted,
            "Purged metrics cache"
        );
        if failed > 0 {
            return Err(CacheError::LockError);
        }
        Ok(evicted)
    }

    /// Names of all components seen so far, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn component_names(&self) -> Result<Vec<String>, CacheError> {
        let components = self
            .components
            .read()
            .map_err(|_| CacheError::LockError)?;
        let mut names: Vec<String> = components.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Renders every component for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned.
    pub fn dump(&self) -> Result<String, CacheError> {
        let mut out = String::new();
        for name in self.component_names()? {
            if let Some(component) = self.get_component(&name)? {
                out.push_str(&format!("\n{name} #> {}", component.dump()?));
            }
        }
        Ok(out)
    }
}
