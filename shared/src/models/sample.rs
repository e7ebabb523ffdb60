//! Metric sample data model.
//!
//! A [`MetricSample`] is one measurement reported by one instance of a
//! component. Samples are never stored as-is; the cache folds them into
//! time buckets on arrival.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Latest accepted observation time: 9999-12-31T23:59:59Z in epoch seconds.
pub const MAX_TIMESTAMP_SECS: i64 = 253_402_300_799;

/// A single metric measurement for one component instance.
///
/// # Example
///
/// ```
/// use shared::models::MetricSample;
///
/// let sample = MetricSample::new("bolt1", "i1", "exe-count", 5.0).with_timestamp(1_700_000_000);
/// assert!(sample.validate_sample().is_ok());
/// assert_eq!(sample.timestamp, 1_700_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MetricSample {
    /// Component the reporting instance belongs to.
    #[validate(length(min = 1, message = "Component name cannot be empty"))]
    pub component_name: String,

    /// Instance that reported the value.
    #[validate(length(min = 1, message = "Instance id cannot be empty"))]
    pub instance_id: String,

    /// Metric name, used to look up the aggregation policy.
    #[validate(length(min = 1, message = "Metric name cannot be empty"))]
    pub metric_name: String,

    /// The measured value.
    pub value: f64,

    /// Epoch seconds at which the value was observed.
    pub timestamp: i64,
}

/// Errors that can occur during sample validation.
#[derive(Debug, Error)]
pub enum SampleValidationError {
    /// The value is NaN or infinite.
    #[error("Metric value must be finite")]
    NonFiniteValue,

    /// The timestamp is before the epoch or after [`MAX_TIMESTAMP_SECS`].
    #[error("Metric timestamp {0} is out of range")]
    TimestampOutOfRange(i64),

    /// Field validation failed.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl MetricSample {
    /// Creates a sample stamped with the current time.
    #[must_use]
    pub fn new(
        component_name: impl Into<String>,
        instance_id: impl Into<String>,
        metric_name: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            instance_id: instance_id.into(),
            metric_name: metric_name.into(),
            value,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Sets the observation time (epoch seconds).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Validates the sample.
    ///
    /// # Errors
    ///
    /// Returns an error if any name is empty, the value is not finite, or the
    /// timestamp lies outside `0..=MAX_TIMESTAMP_SECS`.
    pub fn validate_sample(&self) -> Result<(), SampleValidationError> {
        if !self.value.is_finite() {
            return Err(SampleValidationError::NonFiniteValue);
        }
        if !(0..=MAX_TIMESTAMP_SECS).contains(&self.timestamp) {
            return Err(SampleValidationError::TimestampOutOfRange(self.timestamp));
        }
        self.validate()?;
        Ok(())
    }
}
