//! Periodic cache purge.
//!
//! Evicts buckets that fell out of the retention window so memory stays
//! bounded even for series that stopped receiving samples.

use shared::storage::MetricsCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Background task that purges the metrics cache on a fixed period.
pub struct PurgeTask {
    cache: Arc<MetricsCache>,
    period: Duration,
}

impl PurgeTask {
    /// Creates a new purge task.
    ///
    /// # Arguments
    ///
    /// * `cache` - The cache to purge
    /// * `period` - How often to purge
    #[must_use]
    pub fn new(cache: Arc<MetricsCache>, period: Duration) -> Self {
        Self { cache, period }
    }

    /// Runs one purge. Returns the number of evicted buckets.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache lock is poisoned.
    pub fn purge_once(&self) -> anyhow::Result<usize> {
        Ok(self.cache.purge()?)
    }

    /// Starts the purge loop.
    ///
    /// This function runs until cancelled via the task handle.
    pub async fn run(self: Arc<Self>) {
        let mut tick = interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        tick.tick().await;

        loop {
            tick.tick().await;

            match self.purge_once() {
                Ok(evicted) => {
                    tracing::debug!(evicted, "Scheduled purge finished");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to purge metrics cache");
                }
            }
        }
    }
}
