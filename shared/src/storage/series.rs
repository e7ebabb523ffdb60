//! Fixed-capacity ring of time buckets for one (instance, metric) pair.
//!
//! Slot `head` holds the newest interval; the slot `k` positions behind it
//! holds the interval `k * interval` seconds older. Advancing to a newer
//! interval moves `head` forward and clears every slot it passes, so a series
//! never holds more than `capacity` intervals of data.

use crate::models::{AggregationType, Bucket};
use std::fmt;

/// Circular buffer of buckets for one metric of one instance.
#[derive(Debug, Clone)]
pub struct Series {
    aggregation: AggregationType,
    interval: i64,
    slots: Vec<Option<Bucket>>,
    head: usize,
    /// Start of the interval `head` represents. Survives purges.
    head_start: Option<i64>,
}

impl Series {
    /// Creates an empty series of `capacity` buckets, each `interval` seconds wide.
    ///
    /// A zero capacity or interval is bumped to one.
    #[must_use]
    pub fn new(aggregation: AggregationType, capacity: usize, interval: i64) -> Self {
        Self {
            aggregation,
            interval: interval.max(1),
            slots: vec![None; capacity.max(1)],
            head: 0,
            head_start: None,
        }
    }

    /// Aggregation policy applied to every sample.
    #[must_use]
    pub fn aggregation(&self) -> AggregationType {
        self.aggregation
    }

    /// Maximum number of live buckets.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if no bucket is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Start of the bucket holding `timestamp`, or `None` if it is not representable.
    fn align(&self, timestamp: i64) -> Option<i64> {
        timestamp.checked_sub(timestamp.rem_euclid(self.interval))
    }

    /// Folds `value` observed at `timestamp` into its bucket.
    ///
    /// Returns false if the sample was dropped: it is older than the ring
    /// window, its interval has no bucket (buckets are only created at the
    /// head, never backdated), or its bucket bounds do not fit in `i64`.
    pub fn add(&mut self, value: f64, timestamp: i64) -> bool {
        let bounds = self
            .align(timestamp)
            .and_then(|start| Some((start, start.checked_add(self.interval)?)));
        let Some((start, end)) = bounds else {
            tracing::debug!(timestamp, "Dropping sample with unrepresentable bucket bounds");
            return false;
        };

        if let Some(head_start) = self.head_start {
            if start <= head_start {
                return self.fold_existing(head_start, start, value);
            }
            // A distance that overflows is far past the whole ring.
            let steps = start
                .checked_sub(head_start)
                .map_or(i64::MAX, |distance| distance / self.interval);
            self.advance(steps);
        }

        let mut bucket = Bucket::empty(start, end);
        bucket.fold(self.aggregation, value);
        self.slots[self.head] = Some(bucket);
        self.head_start = Some(start);
        true
    }

    fn fold_existing(&mut self, head_start: i64, start: i64, value: f64) -> bool {
        let capacity = self.capacity();
        let offset = head_start
            .checked_sub(start)
            .and_then(|distance| usize::try_from(distance / self.interval).ok())
            .unwrap_or(usize::MAX);
        if offset >= capacity {
            tracing::debug!(start, head_start, "Dropping sample older than the series window");
            return false;
        }

        let index = (self.head + capacity - offset) % capacity;
        match self.slots[index].as_mut() {
            Some(bucket) if bucket.start_time == start => {
                bucket.fold(self.aggregation, value);
                true
            }
            _ => {
                tracing::debug!(start, "Dropping late sample for an interval with no bucket");
                false
            }
        }
    }

    /// Moves the head forward `steps` intervals, clearing each slot passed.
    fn advance(&mut self, steps: i64) {
        let capacity = self.capacity();
        let steps = usize::try_from(steps).unwrap_or(usize::MAX).min(capacity);
        for _ in 0..steps {
            self.head = (self.head + 1) % capacity;
            self.slots[self.head] = None;
        }
    }

    /// Iterates live buckets from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> + '_ {
        let capacity = self.capacity();
        (0..capacity)
            .rev()
            .filter_map(move |offset| self.slots[(self.head + capacity - offset) % capacity].as_ref())
    }

    /// Returns the buckets overlapping `[start, end]`, oldest first.
    #[must_use]
    pub fn buckets_in(&self, start: i64, end: i64) -> Vec<Bucket> {
        self.iter()
            .filter(|bucket| bucket.overlaps(start, end))
            .copied()
            .collect()
    }

    /// Evicts every bucket ending before `cutoff`.
    ///
    /// Returns the number of buckets evicted.
    pub fn purge(&mut self, cutoff: i64) -> usize {
        let mut evicted = 0;
        for slot in &mut self.slots {
            if slot.is_some_and(|bucket| bucket.end_time < cutoff) {
                *slot = None;
                evicted += 1;
            }
        }
        evicted
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.aggregation)?;
        for (i, bucket) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}-{}: {} ({})",
                bucket.start_time, bucket.end_time, bucket.value, bucket.sample_count
            )?;
        }
        write!(f, "]")
    }
}
