//! Output encodings: JSON snapshot, Prometheus text exposition, and the
//! trailing-window overview.
//!
//! Both full encodings are built from the same snapshot, so the two
//! representations of one instant agree. Exporting never mutates state.

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::aggregator::Telemetry;

/// Derived summary over the trailing window. Samples older than the window
/// are excluded here but stay in the underlying store, so the full export
/// and the overview may disagree in scope.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub window_hours: i64,
    pub metrics: Vec<MetricOverview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricOverview {
    pub name: String,
    pub count: u64,
    pub total: f64,
    pub mean: f64,
    pub per_hour: f64,
}

impl Telemetry {
    /// JSON snapshot: `{timestamp, metrics}` with one aggregate per series.
    pub fn export_json(&self) -> serde_json::Value {
        let snapshot = self.snapshot();
        let metrics: serde_json::Map<String, serde_json::Value> = snapshot
            .into_iter()
            .map(|m| {
                (
                    m.name.clone(),
                    serde_json::json!({
                        "count": m.count,
                        "total": m.total,
                        "mean": m.mean,
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "metrics": metrics,
        })
    }

    /// Prometheus text exposition: HELP/TYPE lines plus one sample line per
    /// series, carrying the series total.
    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();
        for m in self.snapshot() {
            let name = format!("atelier_{}", sanitize_metric_name(&m.name));
            out.push_str(&format!("# HELP {name} Accumulated total for {}\n", m.name));
            out.push_str(&format!("# TYPE {name} counter\n"));
            out.push_str(&format!("{name} {}\n", m.total));
        }
        out
    }

    /// Windowed summary computed only from samples inside the trailing
    /// `window_hours`. Series with no recent samples report zeros.
    pub fn overview(&self, window_hours: i64) -> Overview {
        let window_hours = window_hours.max(1);
        let cutoff = Utc::now() - Duration::hours(window_hours);

        let mut metrics: Vec<MetricOverview> = self
            .samples_since(cutoff)
            .into_iter()
            .map(|(name, samples)| {
                let count = samples.len() as u64;
                let total: f64 = samples.iter().map(|s| s.value).sum();
                MetricOverview {
                    name,
                    count,
                    total,
                    mean: if count == 0 { 0.0 } else { total / count as f64 },
                    per_hour: count as f64 / window_hours as f64,
                }
            })
            .collect();
        metrics.sort_by(|a, b| a.name.cmp(&b.name));

        Overview {
            window_hours,
            metrics,
        }
    }

    /// Windowed ratio of two counters, for health reporting: total of
    /// `numerator` over total of `denominator` in the trailing window.
    /// Returns 0.0 when the denominator has no samples.
    pub fn windowed_ratio(&self, numerator: &str, denominator: &str, window_hours: i64) -> f64 {
        let overview = self.overview(window_hours);
        let total_of = |name: &str| {
            overview
                .metrics
                .iter()
                .find(|m| m.name == name)
                .map(|m| m.total)
                .unwrap_or(0.0)
        };
        let denom = total_of(denominator);
        if denom <= 0.0 {
            0.0
        } else {
            total_of(numerator) / denom
        }
    }
}

/// Restrict a metric name to the Prometheus charset: alphanumerics and
/// underscores, nothing leading with a digit.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
