//! Metrics sinks configuration.
//!
//! The sinks file maps sink names to per-sink settings. The cache reads its
//! aggregation table from the [`CACHE_SINK`] entry, key [`METRICS_TYPE_KEY`]:
//!
//! ```json
//! {
//!   "metricscache-sink": {
//!     "metrics-type": {
//!       "exe-count": "SUM",
//!       "latency": "AVG",
//!       "queue-size": "LAST"
//!     }
//!   }
//! }
//! ```

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Name of the sink whose settings configure the cache.
pub const CACHE_SINK: &str = "metricscache-sink";

/// Key under [`CACHE_SINK`] holding the metric name → aggregation table.
pub const METRICS_TYPE_KEY: &str = "metrics-type";

/// Settings of one sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Metric name → aggregation type string.
    #[serde(
        rename = "metrics-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub metrics_type: Option<HashMap<String, String>>,

    /// Settings the cache does not interpret.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// All configured sinks, keyed by sink name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SinksConfig {
    sinks: HashMap<String, SinkConfig>,
}

impl SinksConfig {
    /// Loads a sinks configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        tracing::info!(path = %path.display(), sinks = config.sinks.len(), "Loaded sinks config");
        Ok(config)
    }

    /// Parses a sinks configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON for this shape.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Builds a configuration holding only the cache sink with `metrics_type`.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::SinksConfig;
    ///
    /// let config = SinksConfig::for_cache([("exe-count", "SUM"), ("latency", "AVG")]);
    /// let types = config.cache_metrics_type().unwrap();
    /// assert_eq!(types.get("latency").map(String::as_str), Some("AVG"));
    /// ```
    #[must_use]
    pub fn for_cache<I, K, V>(metrics_type: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let metrics_type = metrics_type
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut sinks = HashMap::new();
        sinks.insert(
            CACHE_SINK.to_string(),
            SinkConfig {
                metrics_type: Some(metrics_type),
                extra: HashMap::new(),
            },
        );
        Self { sinks }
    }

    /// Returns the settings of sink `name`.
    #[must_use]
    pub fn sink(&self, name: &str) -> Option<&SinkConfig> {
        self.sinks.get(name)
    }

    /// Returns the cache's metric name → aggregation string table.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache sink or its metrics-type table is missing.
    pub fn cache_metrics_type(&self) -> Result<&HashMap<String, String>, ConfigError> {
        let sink = self
            .sink(CACHE_SINK)
            .ok_or_else(|| ConfigError::MissingSink(CACHE_SINK.to_string()))?;
        sink.metrics_type
            .as_ref()
            .ok_or_else(|| ConfigError::MissingKey {
                sink: CACHE_SINK.to_string(),
                key: METRICS_TYPE_KEY.to_string(),
            })
    }
}
