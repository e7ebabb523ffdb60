//! Cache window configuration.
//!
//! Defines the retention window and bucket width of the metrics cache.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default retention window in seconds.
pub const DEFAULT_MAX_INTERVAL_SECS: u64 = 180;

/// Default bucket width in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Upper bound on buckets per series; every series allocates this many slots.
pub const MAX_NINTERVALS: usize = 86_400;

/// Retention window and bucket width of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How far back buckets are retained, in seconds.
    pub max_interval: u64,
    /// Width of one bucket, in seconds.
    pub interval: u64,
}

impl CacheConfig {
    /// Creates a new cache configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::CacheConfig;
    ///
    /// let config = CacheConfig::new(60, 10);
    /// assert_eq!(config.nintervals(), 6);
    ///
    /// // Widths that do not divide the window are truncated.
    /// assert_eq!(CacheConfig::new(65, 10).nintervals(), 6);
    /// ```
    #[must_use]
    pub const fn new(max_interval: u64, interval: u64) -> Self {
        Self {
            max_interval,
            interval,
        }
    }

    /// Number of buckets kept per series.
    #[must_use]
    pub const fn nintervals(&self) -> usize {
        if self.interval == 0 {
            return 0;
        }
        (self.max_interval / self.interval) as usize
    }

    /// Returns the retention window as a `Duration`.
    #[must_use]
    pub const fn max_interval_duration(&self) -> Duration {
        Duration::from_secs(self.max_interval)
    }

    /// Returns the bucket width as a `Duration`.
    #[must_use]
    pub const fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bucket width is zero
    /// - The bucket width is larger than the retention window
    /// - Either value does not fit in signed epoch seconds
    /// - The window holds more than [`MAX_NINTERVALS`] buckets
    pub fn validate(&self) -> Result<(), String> {
        if self.interval == 0 {
            return Err("Bucket interval must be greater than zero".to_string());
        }
        if self.interval > self.max_interval {
            return Err(format!(
                "Bucket interval ({}s) cannot exceed max interval ({}s)",
                self.interval, self.max_interval
            ));
        }
        if i64::try_from(self.max_interval).is_err() {
            return Err("Max interval is too large".to_string());
        }
        if self.max_interval / self.interval > MAX_NINTERVALS as u64 {
            return Err(format!(
                "Max interval ({}s) holds more than {MAX_NINTERVALS} buckets of {}s",
                self.max_interval, self.interval
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INTERVAL_SECS, DEFAULT_INTERVAL_SECS)
    }
}
