//! Data models for the metrics cache.
//!
//! This module contains the sample, bucket and aggregation types, plus the
//! internal query request/response shapes.

pub mod aggregation;
pub mod bucket;
pub mod query;
pub mod sample;

pub use aggregation::{AggregationRegistry, AggregationType};
pub use bucket::Bucket;
pub use query::{
    InstanceSeries, MetricCacheRequest, MetricCacheResponse, QueryWindow, Status, StatusCode,
    MISSING_WINDOW_MESSAGE,
};
pub use sample::{MetricSample, SampleValidationError, MAX_TIMESTAMP_SECS};
