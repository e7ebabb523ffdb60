//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::CacheConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default location of the metrics sinks file.
pub const DEFAULT_SINKS_CONFIG: &str = "config/metrics_sinks.json";

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `METRICSCACHE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `METRICSCACHE_PORT`: The port to listen on (default: 8080)
/// - `METRICSCACHE_MAX_INTERVAL`: Retention window in seconds (default: 180)
/// - `METRICSCACHE_INTERVAL`: Bucket width in seconds (default: 60)
/// - `METRICSCACHE_PURGE_INTERVAL`: Seconds between purges (default: the bucket width)
/// - `METRICSCACHE_SINKS_CONFIG`: Path of the metrics sinks file
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Retention window in seconds.
    pub max_interval: u64,
    /// Bucket width in seconds.
    pub interval: u64,
    /// Seconds between background purges.
    pub purge_interval: u64,
    /// Path of the metrics sinks file.
    pub sinks_config: PathBuf,
}

fn env_number<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(name)
        .ok()
        .map(|value| value.parse::<T>())
        .transpose()
        .with_context(|| format!("{name} must be a number"))
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A numeric variable is set but cannot be parsed
    /// - The resulting cache windows are invalid
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("METRICSCACHE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_number("METRICSCACHE_PORT")?.unwrap_or(8080);

        let defaults = CacheConfig::default();
        let max_interval =
            env_number("METRICSCACHE_MAX_INTERVAL")?.unwrap_or(defaults.max_interval);
        let interval = env_number("METRICSCACHE_INTERVAL")?.unwrap_or(defaults.interval);
        let purge_interval = env_number("METRICSCACHE_PURGE_INTERVAL")?.unwrap_or(interval);

        let sinks_config = std::env::var("METRICSCACHE_SINKS_CONFIG")
            .map_or_else(|_| PathBuf::from(DEFAULT_SINKS_CONFIG), PathBuf::from);

        let config = Self {
            host,
            port,
            max_interval,
            interval,
            purge_interval,
            sinks_config,
        };
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validates the cache windows and purge period.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        self.cache_config().validate()?;
        if self.purge_interval == 0 {
            return Err("Purge interval must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Returns the cache windows.
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.max_interval, self.interval)
    }

    /// Returns the period of the background purge.
    #[must_use]
    pub fn purge_period(&self) -> Duration {
        Duration::from_secs(self.purge_interval)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port cannot be parsed as a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_interval: cache.max_interval,
            interval: cache.interval,
            purge_interval: cache.interval,
            sinks_config: PathBuf::from(DEFAULT_SINKS_CONFIG),
        }
    }
}
