//! Per-component metric storage.
//!
//! A [`ComponentMetrics`] owns every [`Series`] of one component, keyed by
//! instance id and then metric name. All series of a component share one
//! lock, so folds, reads and purges of a component are serialized while
//! unrelated components proceed independently.

use super::cache::CacheError;
use super::series::Series;
use crate::models::{AggregationType, InstanceSeries};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

type InstanceMap = HashMap<String, HashMap<String, Series>>;

/// All bucket series of one component.
#[derive(Debug)]
pub struct ComponentMetrics {
    name: String,
    nintervals: usize,
    interval: i64,
    instances: RwLock<InstanceMap>,
}

impl ComponentMetrics {
    /// Creates an empty store whose series hold `nintervals` buckets of
    /// `interval` seconds.
    #[must_use]
    pub fn new(name: impl Into<String>, nintervals: usize, interval: i64) -> Self {
        Self {
            name: name.into(),
            nintervals,
            interval,
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folds one sample into the series for `(instance_id, metric_name)`,
    /// creating the series on first use.
    ///
    /// Returns whether the sample landed in a bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the component lock is poisoned.
    pub fn add_metric_for_instance(
        &self,
        instance_id: &str,
        metric_name: &str,
        aggregation: AggregationType,
        value: f64,
        timestamp: i64,
    ) -> Result<bool, CacheError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| CacheError::LockError)?;

        let metrics = instances.entry(instance_id.to_string()).or_default();
        let series = metrics.entry(metric_name.to_string()).or_insert_with(|| {
            if aggregation == AggregationType::Unknown {
                tracing::warn!(
                    component = %self.name,
                    instance = %instance_id,
                    metric = %metric_name,
                    "No aggregation type for metric, keeping last value"
                );
            }
            Series::new(aggregation, self.nintervals, self.interval)
        });

        let stored = series.add(value, timestamp);
        if !stored {
            tracing::debug!(
                component = %self.name,
                instance = %instance_id,
                metric = %metric_name,
                timestamp,
                "Sample dropped"
            );
        }
        Ok(stored)
    }

    /// Returns the buckets overlapping `[start, end]`.
    ///
    /// `instance_ids` and `metric_names` restrict the result; an empty slice
    /// selects everything. Every selected series appears in the result, with
    /// an empty list if none of its buckets overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if the component lock is poisoned.
    pub fn get_metrics(
        &self,
        start: i64,
        end: i64,
        instance_ids: &[String],
        metric_names: &[String],
    ) -> Result<BTreeMap<String, InstanceSeries>, CacheError> {
        let instances = self
            .instances
            .read()
            .map_err(|_| CacheError::LockError)?;

        let selected = instances
            .iter()
            .filter(|(id, _)| instance_ids.is_empty() || instance_ids.contains(*id));

        let mut result = BTreeMap::new();
        for (instance_id, metrics) in selected {
            let series: InstanceSeries = metrics
                .iter()
                .filter(|(name, _)| metric_names.is_empty() || metric_names.contains(*name))
                .map(|(name, series)| (name.clone(), series.buckets_in(start, end)))
                .collect();
            result.insert(instance_id.clone(), series);
        }

        Ok(result)
    }

    /// Evicts every bucket ending before `cutoff`.
    ///
    /// Returns the number of buckets evicted.
    ///
    /// # Errors
    ///
    /// Returns an error if the component lock is poisoned.
    pub fn purge(&self, cutoff: i64) -> Result<usize, CacheError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| CacheError::LockError)?;

        Ok(instances
            .values_mut()
            .flat_map(HashMap::values_mut)
            .map(|series| series.purge(cutoff))
            .sum())
    }

    /// Number of instances seen so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the component lock is poisoned.
    pub fn instance_count(&self) -> Result<usize, CacheError> {
        let instances = self
            .instances
            .read()
            .map_err(|_| CacheError::LockError)?;
        Ok(instances.len())
    }

    /// Renders every series of this component, sorted by instance and metric.
    ///
    /// # Errors
    ///
    /// Returns an error if the component lock is poisoned.
    pub fn dump(&self) -> Result<String, CacheError> {
        let instances = self
            .instances
            .read()
            .map_err(|_| CacheError::LockError)?;

        let sorted: BTreeMap<_, BTreeMap<_, _>> = instances
            .iter()
            .map(|(id, metrics)| (id, metrics.iter().collect()))
            .collect();

        let mut out = String::new();
        for (instance_id, metrics) in sorted {
            out.push_str(&format!("\n  {instance_id}:"));
            for (name, series) in metrics {
                out.push_str(&format!("\n    {name} => {series}"));
            }
        }
        Ok(out)
    }

    /// Poisons the component lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.instances.write();
            panic!("poisoning {}", self.name);
        }));
        assert!(result.is_err());
        assert!(self.instances.is_poisoned());
    }
}
