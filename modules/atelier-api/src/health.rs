use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

use atelier_common::AtelierError;
use atelier_telemetry::Telemetry;

use crate::AppState;

/// Error rate (http.errors / http.requests over the trailing hour) above
/// which the service reports degraded while still serving traffic.
const DEGRADED_ERROR_RATE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: String,
    pub database: &'static str,
    pub error_rate: f64,
    pub uptime_seconds: u64,
    pub features: Features,
}

/// Feature surface of this deployment, reported for monitoring dashboards.
#[derive(Debug, Serialize)]
pub struct Features {
    pub events: bool,
    pub mentions: bool,
    pub telemetry: bool,
}

#[derive(Clone)]
pub struct HealthChecker {
    pool: PgPool,
    telemetry: Telemetry,
}

impl HealthChecker {
    pub fn new(pool: PgPool, telemetry: Telemetry) -> Self {
        Self { pool, telemetry }
    }

    /// Ping the database and derive the current status. Any failure here
    /// comes back as an Err for the handler to report, never a panic.
    pub async fn check(&self) -> Result<HealthReport, AtelierError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        let error_rate = self
            .telemetry
            .windowed_ratio("http.errors", "http.requests", 1);

        Ok(HealthReport {
            status: derive_status(error_rate),
            timestamp: Utc::now().to_rfc3339(),
            database: "ok",
            error_rate,
            uptime_seconds: self.telemetry.uptime_seconds(),
            features: Features {
                events: true,
                mentions: true,
                telemetry: true,
            },
        })
    }
}

/// Healthy below the degraded threshold, degraded above it. Unhealthy is
/// only reported when the check itself fails.
pub fn derive_status(error_rate: f64) -> HealthStatus {
    if error_rate > DEGRADED_ERROR_RATE {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// GET /health, unauthenticated. Healthy and degraded both answer 200;
/// a failed check answers 503 with an error message, never an unhandled
/// fault.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.health.check().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": "health check failed",
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            )
                .into_response()
        }
    }
}
