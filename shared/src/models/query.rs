//! Internal query request and response shapes.
//!
//! These are the in-process call format of the cache. The protobuf wire
//! format in [`crate::wire`] is translated into and out of these types.

use crate::models::Bucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message returned when a request carries no time window.
pub const MISSING_WINDOW_MESSAGE: &str = "No interval or explicit interval set";

/// Time range of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryWindow {
    /// The last N seconds up to now. `<= 0` means since epoch 0.
    Relative(i64),
    /// Absolute epoch-second bounds.
    Explicit {
        /// Window start.
        start: i64,
        /// Window end.
        end: i64,
    },
}

impl QueryWindow {
    /// Resolves the window to `(start, end)` epoch seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::QueryWindow;
    ///
    /// assert_eq!(QueryWindow::Relative(10).resolve(1_000), (990, 1_000));
    /// assert_eq!(QueryWindow::Relative(0).resolve(1_000), (0, 1_000));
    /// assert_eq!(QueryWindow::Relative(5_000).resolve(1_000), (0, 1_000));
    /// assert_eq!(QueryWindow::Explicit { start: 3, end: 7 }.resolve(1_000), (3, 7));
    /// ```
    #[must_use]
    pub fn resolve(&self, now: i64) -> (i64, i64) {
        match *self {
            Self::Relative(seconds) if seconds > 0 => (now.saturating_sub(seconds).max(0), now),
            Self::Relative(_) => (0, now),
            Self::Explicit { start, end } => (start, end),
        }
    }
}

/// Query for one component's buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCacheRequest {
    /// Component to query.
    pub component_name: String,

    /// Restrict to these instances. Empty means all instances.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_ids: Vec<String>,

    /// Restrict to these metric names. Empty means all metrics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_names: Vec<String>,

    /// Time range. A request without one is rejected.
    #[serde(default)]
    pub window: Option<QueryWindow>,
}

impl MetricCacheRequest {
    /// Creates a request for `component_name` with no window set.
    #[must_use]
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            instance_ids: Vec::new(),
            metric_names: Vec::new(),
            window: None,
        }
    }

    /// Queries the last `seconds` seconds.
    #[must_use]
    pub fn with_relative(mut self, seconds: i64) -> Self {
        self.window = Some(QueryWindow::Relative(seconds));
        self
    }

    /// Queries the explicit range `[start, end]`.
    #[must_use]
    pub fn with_explicit(mut self, start: i64, end: i64) -> Self {
        self.window = Some(QueryWindow::Explicit { start, end });
        self
    }

    /// Adds an instance id filter.
    #[must_use]
    pub fn with_instance(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_ids.push(instance_id.into());
        self
    }

    /// Adds a metric name filter.
    #[must_use]
    pub fn with_metric(mut self, metric_name: impl Into<String>) -> Self {
        self.metric_names.push(metric_name.into());
        self
    }
}

/// Outcome of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusCode {
    /// The query ran.
    Ok,
    /// The query was rejected; see the status message.
    #[serde(rename = "NOTOK")]
    NotOk,
}

/// Status code plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Outcome.
    pub code: StatusCode,
    /// Explanation, empty on success.
    #[serde(default)]
    pub message: String,
}

impl Status {
    /// A successful status with no message.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: StatusCode::Ok,
            message: String::new(),
        }
    }

    /// A failed status carrying `message`.
    #[must_use]
    pub fn not_ok(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::NotOk,
            message: message.into(),
        }
    }
}

/// Buckets of one instance, keyed by metric name.
pub type InstanceSeries = BTreeMap<String, Vec<Bucket>>;

/// Result of a query: instance id → metric name → ordered buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCacheResponse {
    /// Whether the query ran.
    pub status: Status,
    /// Seconds between the resolved window start and end.
    #[serde(default)]
    pub interval: i64,
    /// Per-instance bucket series.
    #[serde(default)]
    pub series: BTreeMap<String, InstanceSeries>,
}

impl MetricCacheResponse {
    /// Creates an OK response with no series.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: Status::ok(),
            interval: 0,
            series: BTreeMap::new(),
        }
    }

    /// Creates a failed response with no series.
    #[must_use]
    pub fn not_ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::not_ok(message),
            interval: 0,
            series: BTreeMap::new(),
        }
    }

    /// Returns true if the status is OK.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.code == StatusCode::Ok
    }

    /// Returns the buckets for one instance and metric, if present.
    #[must_use]
    pub fn buckets(&self, instance_id: &str, metric_name: &str) -> Option<&[Bucket]> {
        self.series
            .get(instance_id)
            .and_then(|metrics| metrics.get(metric_name))
            .map(Vec::as_slice)
    }
}
