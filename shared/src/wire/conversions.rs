//! Conversion between wire messages and internal shapes.
//!
//! Every function here is a pure structural mapping. Instances and metrics
//! are emitted in sorted order on the wire, which is the iteration order of
//! the internal maps, so a response survives a round trip unchanged.

use super::{
    IndividualMetric, IntervalValue, MetricDatum, MetricInterval, MetricRequest, MetricResponse,
    PublishMetrics, TaskMetric,
};
use crate::models::{
    Bucket, InstanceSeries, MetricCacheRequest, MetricCacheResponse, MetricSample, QueryWindow,
    Status, StatusCode,
};
use std::collections::BTreeMap;

/// Converts a wire query into the internal request.
///
/// A request carrying both a relative and an explicit interval uses the
/// relative one.
#[must_use]
pub fn request_from_wire(request: &MetricRequest) -> MetricCacheRequest {
    let window = match (request.interval, request.explicit_interval) {
        (Some(seconds), _) => Some(QueryWindow::Relative(seconds)),
        (None, Some(interval)) => Some(QueryWindow::Explicit {
            start: interval.start,
            end: interval.end,
        }),
        (None, None) => None,
    };

    MetricCacheRequest {
        component_name: request.component_name.clone(),
        instance_ids: request.instance_id.clone(),
        metric_names: request.metric.clone(),
        window,
    }
}

/// Converts an internal request into a wire query.
#[must_use]
pub fn request_to_wire(request: &MetricCacheRequest) -> MetricRequest {
    let (interval, explicit_interval) = match request.window {
        Some(QueryWindow::Relative(seconds)) => (Some(seconds), None),
        Some(QueryWindow::Explicit { start, end }) => (None, Some(MetricInterval { start, end })),
        None => (None, None),
    };

    MetricRequest {
        component_name: request.component_name.clone(),
        instance_id: request.instance_ids.clone(),
        metric: request.metric_names.clone(),
        interval,
        explicit_interval,
    }
}

fn status_code_to_wire(code: StatusCode) -> super::StatusCode {
    match code {
        StatusCode::Ok => super::StatusCode::Ok,
        StatusCode::NotOk => super::StatusCode::Notok,
    }
}

fn status_code_from_wire(code: super::StatusCode) -> StatusCode {
    match code {
        super::StatusCode::Ok => StatusCode::Ok,
        super::StatusCode::Notok | super::StatusCode::Unspecified => StatusCode::NotOk,
    }
}

fn bucket_to_wire(bucket: &Bucket) -> IntervalValue {
    IntervalValue {
        start: bucket.start_time,
        end: bucket.end_time,
        value: bucket.value,
        sample_count: bucket.sample_count,
    }
}

fn bucket_from_wire(value: &IntervalValue) -> Bucket {
    Bucket {
        start_time: value.start,
        end_time: value.end,
        value: value.value,
        sample_count: value.sample_count,
    }
}

/// Converts an internal response into the wire response.
#[must_use]
pub fn response_to_wire(response: &MetricCacheResponse) -> MetricResponse {
    let metric = response
        .series
        .iter()
        .map(|(instance_id, metrics)| TaskMetric {
            instance_id: instance_id.clone(),
            metric: metrics
                .iter()
                .map(|(name, buckets)| IndividualMetric {
                    name: name.clone(),
                    interval_values: buckets.iter().map(bucket_to_wire).collect(),
                })
                .collect(),
        })
        .collect();

    MetricResponse {
        status: Some(super::Status {
            status: status_code_to_wire(response.status.code) as i32,
            message: response.status.message.clone(),
        }),
        metric,
        interval: response.interval,
    }
}

/// Converts a wire response into the internal response.
///
/// A missing or unrecognized status is treated as NOTOK.
#[must_use]
pub fn response_from_wire(response: &MetricResponse) -> MetricCacheResponse {
    let status = response.status.as_ref().map_or_else(
        || Status::not_ok(String::new()),
        |status| Status {
            code: status_code_from_wire(status.status()),
            message: status.message.clone(),
        },
    );

    let series: BTreeMap<String, InstanceSeries> = response
        .metric
        .iter()
        .map(|task| {
            let metrics = task
                .metric
                .iter()
                .map(|metric| {
                    (
                        metric.name.clone(),
                        metric.interval_values.iter().map(bucket_from_wire).collect(),
                    )
                })
                .collect();
            (task.instance_id.clone(), metrics)
        })
        .collect();

    MetricCacheResponse {
        status,
        interval: response.interval,
        series,
    }
}

/// Converts one published datum into a sample, stamping `now` when the datum
/// carries no timestamp.
#[must_use]
pub fn sample_from_wire(datum: &MetricDatum, now: i64) -> MetricSample {
    MetricSample {
        component_name: datum.component_name.clone(),
        instance_id: datum.instance_id.clone(),
        metric_name: datum.name.clone(),
        value: datum.value,
        timestamp: datum.timestamp.unwrap_or(now),
    }
}

/// Converts a sample into a published datum.
#[must_use]
pub fn sample_to_wire(sample: &MetricSample) -> MetricDatum {
    MetricDatum {
        component_name: sample.component_name.clone(),
        instance_id: sample.instance_id.clone(),
        name: sample.metric_name.clone(),
        value: sample.value,
        timestamp: Some(sample.timestamp),
    }
}

/// Converts a published batch into samples.
#[must_use]
pub fn publish_to_samples(publish: &PublishMetrics, now: i64) -> Vec<MetricSample> {
    publish
        .metrics
        .iter()
        .map(|datum| sample_from_wire(datum, now))
        .collect()
}

/// Builds a published batch from samples.
#[must_use]
pub fn samples_to_publish(samples: &[MetricSample]) -> PublishMetrics {
    PublishMetrics {
        metrics: samples.iter().map(sample_to_wire).collect(),
    }
}


#[cfg(test)]
#[path = "conversions_test.rs"]
mod conversions_test;
