//! In-process telemetry: counters and duration samples.
//!
//! The aggregator is an explicitly constructed, injected instance; tests
//! build isolated instances, nothing lives in a global. State is held for
//! the life of the process and discarded at shutdown; nothing persists.

pub mod aggregator;
pub mod export;

pub use aggregator::{MetricSnapshot, Telemetry, TimerGuard};
pub use export::{sanitize_metric_name, MetricOverview, Overview};
