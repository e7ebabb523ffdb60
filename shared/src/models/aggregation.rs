//! Aggregation policies and the metric-name registry.
//!
//! Every metric name is bound to an [`AggregationType`] once, when the cache is
//! built. The registry is read-only afterwards, so lookups need no locking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How samples landing in the same bucket are folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationType {
    /// Values are added up.
    Sum,
    /// Running arithmetic mean of all values.
    #[serde(rename = "AVG")]
    Average,
    /// The most recent value wins.
    Last,
    /// No policy configured; folds as [`AggregationType::Last`].
    Unknown,
}

impl AggregationType {
    /// Parses a configuration string (`SUM`, `AVG` or `LAST`).
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn from_config_str(value: &str) -> Option<Self> {
        match value {
            "SUM" => Some(Self::Sum),
            "AVG" => Some(Self::Average),
            "LAST" => Some(Self::Last),
            _ => None,
        }
    }

    /// Returns the configuration spelling of this policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Average => "AVG",
            Self::Last => "LAST",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Folds `value` into an accumulator holding `count` previous samples.
    ///
    /// Returns the new accumulated value. The caller is responsible for
    /// incrementing the sample count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fold(&self, current: f64, count: u64, value: f64) -> f64 {
        if count == 0 {
            return value;
        }
        match self {
            Self::Sum => current + value,
            Self::Average => {
                let n = count as f64;
                (current * n + value) / (n + 1.0)
            }
            Self::Last | Self::Unknown => value,
        }
    }
}

impl std::fmt::Display for AggregationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable mapping from metric name to aggregation policy.
///
/// # Example
///
/// ```
/// use shared::models::{AggregationRegistry, AggregationType};
/// use std::collections::HashMap;
///
/// let mut types = HashMap::new();
/// types.insert("exe-count".to_string(), "SUM".to_string());
/// types.insert("weird".to_string(), "MEDIAN".to_string());
///
/// let registry = AggregationRegistry::from_config(&types);
/// assert_eq!(registry.resolve("exe-count"), AggregationType::Sum);
/// assert_eq!(registry.resolve("weird"), AggregationType::Unknown);
/// assert_eq!(registry.resolve("never-configured"), AggregationType::Unknown);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AggregationRegistry {
    types: HashMap<String, AggregationType>,
}

impl AggregationRegistry {
    /// Builds the registry from a metric name to type-string table.
    ///
    /// Unrecognized type strings are logged and stored as
    /// [`AggregationType::Unknown`]; they never fail construction.
    #[must_use]
    pub fn from_config(types: &HashMap<String, String>) -> Self {
        let types = types
            .iter()
            .map(|(name, kind)| {
                let resolved = AggregationType::from_config_str(kind).unwrap_or_else(|| {
                    tracing::error!(
                        metric = %name,
                        aggregation = %kind,
                        "Unknown metrics type in metrics sinks"
                    );
                    AggregationType::Unknown
                });
                (name.clone(), resolved)
            })
            .collect();

        Self { types }
    }

    /// Returns the policy for `metric_name`, or `Unknown` if none is configured.
    #[must_use]
    pub fn resolve(&self, metric_name: &str) -> AggregationType {
        self.types.get(metric_name).copied().unwrap_or_else(|| {
            tracing::debug!(metric = %metric_name, "No aggregation type configured");
            AggregationType::Unknown
        })
    }

    /// Number of configured metric names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no metric names are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
