//! In-memory metric storage.
//!
//! Three layers, innermost first:
//!
//! - [`Series`] - a fixed ring of time buckets for one metric of one instance
//! - [`ComponentMetrics`] - every series of one component behind one lock
//! - [`MetricsCache`] - the coordinator owning one store per component

pub mod cache;
pub mod component;
pub mod series;

pub use cache::{CacheError, MetricsCache};
pub use component::ComponentMetrics;
pub use series::Series;
