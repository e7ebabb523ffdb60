//! External wire format.
//!
//! Protobuf messages exchanged with metric emitters and out-of-process query
//! clients. The messages are declared with `prost` derives; [`conversions`]
//! maps them to and from the internal shapes in [`crate::models`].
//!
//! Equivalent `.proto` definition:
//!
//! ```protobuf
//! message MetricDatum {
//!   string component_name = 1;
//!   string instance_id = 2;
//!   string name = 3;
//!   double value = 4;
//!   optional int64 timestamp = 5;
//! }
//! message PublishMetrics { repeated MetricDatum metrics = 1; }
//!
//! message MetricInterval { int64 start = 1; int64 end = 2; }
//! message MetricRequest {
//!   string component_name = 1;
//!   repeated string instance_id = 2;
//!   repeated string metric = 3;
//!   optional int64 interval = 4;
//!   optional MetricInterval explicit_interval = 5;
//! }
//!
//! enum StatusCode { STATUS_CODE_UNSPECIFIED = 0; OK = 1; NOTOK = 2; }
//! message Status { StatusCode status = 1; string message = 2; }
//! message IntervalValue { int64 start = 1; int64 end = 2; double value = 3; uint64 sample_count = 4; }
//! message IndividualMetric { string name = 1; repeated IntervalValue interval_values = 2; }
//! message TaskMetric { string instance_id = 1; repeated IndividualMetric metric = 2; }
//! message MetricResponse { Status status = 1; repeated TaskMetric metric = 2; int64 interval = 3; }
//! ```

pub mod conversions;

/// Content type of protobuf request and response bodies.
pub const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";

/// One reported metric value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricDatum {
    /// Component the instance belongs to.
    #[prost(string, tag = "1")]
    pub component_name: ::prost::alloc::string::String,
    /// Reporting instance.
    #[prost(string, tag = "2")]
    pub instance_id: ::prost::alloc::string::String,
    /// Metric name.
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    /// Measured value.
    #[prost(double, tag = "4")]
    pub value: f64,
    /// Observation time in epoch seconds; ingestion time when absent.
    #[prost(int64, optional, tag = "5")]
    pub timestamp: ::core::option::Option<i64>,
}

/// Batch of metric values published by an emitter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishMetrics {
    /// Values in the batch.
    #[prost(message, repeated, tag = "1")]
    pub metrics: ::prost::alloc::vec::Vec<MetricDatum>,
}

/// Absolute time range in epoch seconds.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct MetricInterval {
    /// Range start.
    #[prost(int64, tag = "1")]
    pub start: i64,
    /// Range end.
    #[prost(int64, tag = "2")]
    pub end: i64,
}

/// Query for one component's buckets.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricRequest {
    /// Component to query.
    #[prost(string, tag = "1")]
    pub component_name: ::prost::alloc::string::String,
    /// Instance filter; empty selects all instances.
    #[prost(string, repeated, tag = "2")]
    pub instance_id: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Metric filter; empty selects all metrics.
    #[prost(string, repeated, tag = "3")]
    pub metric: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Relative window: the last N seconds.
    #[prost(int64, optional, tag = "4")]
    pub interval: ::core::option::Option<i64>,
    /// Explicit window.
    #[prost(message, optional, tag = "5")]
    pub explicit_interval: ::core::option::Option<MetricInterval>,
}

/// Wire status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    /// Not set.
    Unspecified = 0,
    /// The query ran.
    Ok = 1,
    /// The query was rejected.
    Notok = 2,
}

/// Status of a response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    /// Status code.
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub status: i32,
    /// Explanation.
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

/// One bucket.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IntervalValue {
    /// Bucket start.
    #[prost(int64, tag = "1")]
    pub start: i64,
    /// Bucket end.
    #[prost(int64, tag = "2")]
    pub end: i64,
    /// Aggregated value.
    #[prost(double, tag = "3")]
    pub value: f64,
    /// Samples folded into the value.
    #[prost(uint64, tag = "4")]
    pub sample_count: u64,
}

/// Buckets of one metric.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndividualMetric {
    /// Metric name.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// Buckets, oldest first.
    #[prost(message, repeated, tag = "2")]
    pub interval_values: ::prost::alloc::vec::Vec<IntervalValue>,
}

/// Metrics of one instance.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskMetric {
    /// Instance id.
    #[prost(string, tag = "1")]
    pub instance_id: ::prost::alloc::string::String,
    /// Metrics, sorted by name.
    #[prost(message, repeated, tag = "2")]
    pub metric: ::prost::alloc::vec::Vec<IndividualMetric>,
}

/// Result of a query.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricResponse {
    /// Query status.
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
    /// Instances, sorted by id.
    #[prost(message, repeated, tag = "2")]
    pub metric: ::prost::alloc::vec::Vec<TaskMetric>,
    /// Seconds between the resolved window start and end.
    #[prost(int64, tag = "3")]
    pub interval: i64,
}
