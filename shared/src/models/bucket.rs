//! Time bucket data model.

use crate::models::AggregationType;
use serde::{Deserialize, Serialize};

/// A fixed-width time slice holding one aggregated value.
///
/// The bucket covers `[start_time, end_time)` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Inclusive start of the slice.
    pub start_time: i64,
    /// Exclusive end of the slice.
    pub end_time: i64,
    /// Value folded from every sample in the slice.
    pub value: f64,
    /// Number of samples folded into `value`.
    pub sample_count: u64,
}

impl Bucket {
    /// Creates an empty bucket for `[start_time, end_time)`.
    #[must_use]
    pub const fn empty(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
            value: 0.0,
            sample_count: 0,
        }
    }

    /// Returns true if `timestamp` falls inside this bucket.
    #[must_use]
    pub const fn contains(&self, timestamp: i64) -> bool {
        self.start_time <= timestamp && timestamp < self.end_time
    }

    /// Returns true if this bucket overlaps the closed window `[start, end]`.
    #[must_use]
    pub const fn overlaps(&self, start: i64, end: i64) -> bool {
        self.start_time <= end && self.end_time > start
    }

    /// Folds one sample into the bucket.
    pub fn fold(&mut self, aggregation: AggregationType, value: f64) {
        self.value = aggregation.fold(self.value, self.sample_count, value);
        self.sample_count += 1;
    }
}
