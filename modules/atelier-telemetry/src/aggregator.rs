//! The aggregator itself: a name→series map behind a synchronous lock.
//!
//! All mutations to a given metric go through the lock, so concurrent
//! recorders never lose updates. No operation here suspends; handlers may
//! call these from any context.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// One named series. A counter is a series whose samples are its
/// increments; a timer is a series whose samples are elapsed milliseconds.
#[derive(Debug, Default)]
pub(crate) struct MetricSeries {
    pub total: f64,
    pub samples: Vec<Sample>,
}

struct Inner {
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    series: Mutex<HashMap<String, MetricSeries>>,
}

/// Process-local telemetry aggregator. Cheap to clone; all clones share
/// the same state.
#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<Inner>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                started_at: Instant::now(),
                started_at_utc: Utc::now(),
                series: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Add `value` to the named series and append a timestamped sample.
    pub fn record(&self, name: &str, value: f64) {
        let mut series = self.inner.series.lock();
        let entry = series.entry(name.to_string()).or_default();
        entry.total += value;
        entry.samples.push(Sample {
            at: Utc::now(),
            value,
        });
    }

    /// Record a start instant. Call `stop` on the returned guard to record
    /// the elapsed duration as one sample under `name`. Two timers under
    /// the same name produce two independent samples.
    pub fn start_timer(&self, name: &str) -> TimerGuard {
        TimerGuard {
            telemetry: self.clone(),
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Read-only view of every series: name, sample count, total, mean.
    /// Sorted by name. Reading never mutates state.
    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        let series = self.inner.series.lock();
        let mut out: Vec<MetricSnapshot> = series
            .iter()
            .map(|(name, s)| MetricSnapshot {
                name: name.clone(),
                count: s.samples.len() as u64,
                total: s.total,
                mean: if s.samples.is_empty() {
                    0.0
                } else {
                    s.total / s.samples.len() as f64
                },
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Samples for each series newer than `cutoff`, keyed by name. Used by
    /// the windowed overview; the underlying store is left untouched.
    pub(crate) fn samples_since(&self, cutoff: DateTime<Utc>) -> HashMap<String, Vec<Sample>> {
        let series = self.inner.series.lock();
        series
            .iter()
            .map(|(name, s)| {
                let recent: Vec<Sample> =
                    s.samples.iter().copied().filter(|s| s.at >= cutoff).collect();
                (name.clone(), recent)
            })
            .collect()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at_utc
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate view of one series at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub name: String,
    pub count: u64,
    pub total: f64,
    pub mean: f64,
}

/// Returned by `start_timer`. Consumed by `stop`, which records the
/// elapsed duration and returns it.
pub struct TimerGuard {
    telemetry: Telemetry,
    name: String,
    start: Instant,
}

impl TimerGuard {
    pub fn stop(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.telemetry
            .record(&self.name, elapsed.as_secs_f64() * 1000.0);
        elapsed
    }
}
