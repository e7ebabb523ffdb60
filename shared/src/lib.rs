//! Metricscache Shared Library
//!
//! This crate contains the in-memory metrics cache and the types shared by
//! the API server and the CLI.
//!
//! # Modules
//!
//! - [`models`] - Samples, buckets, aggregation policies and query shapes
//! - [`config`] - Cache windows and metrics sink configuration
//! - [`storage`] - Bucket series, component stores and the cache coordinator
//! - [`wire`] - Protobuf messages and their conversions
//!
//! # Example
//!
//! ```
//! use shared::config::{CacheConfig, SinksConfig};
//! use shared::models::{MetricCacheRequest, MetricSample};
//! use shared::storage::MetricsCache;
//!
//! let sinks = SinksConfig::for_cache([("latency", "AVG")]);
//! let cache = MetricsCache::new(CacheConfig::default(), &sinks).unwrap();
//!
//! cache
//!     .add_metrics([10.0, 20.0].map(|v| {
//!         MetricSample::new("bolt1", "i1", "latency", v).with_timestamp(1_200)
//!     }))
//!     .unwrap();
//!
//! let request = MetricCacheRequest::new("bolt1").with_explicit(1_200, 1_260);
//! let response = cache.query(&request).unwrap();
//! assert_eq!(response.buckets("i1", "latency").unwrap()[0].value, 15.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod storage;
pub mod wire;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use prost;
pub use serde;
pub use serde_json;
pub use validator;
