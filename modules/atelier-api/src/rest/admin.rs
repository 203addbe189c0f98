use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

use crate::auth::Session;
use crate::AppState;

pub const DEFAULT_OVERVIEW_HOURS: i64 = 24;
pub const MAX_OVERVIEW_HOURS: i64 = 168; // one week

#[derive(Deserialize)]
pub struct PerformanceQuery {
    format: Option<String>,
    hours: Option<i64>,
}

/// Clamp the overview window to 1..=168 hours, defaulting to 24.
pub fn clamp_hours(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_OVERVIEW_HOURS)
        .clamp(1, MAX_OVERVIEW_HOURS)
}

/// GET /admin/performance?format=json|prometheus&hours=, authenticated.
/// The prometheus format is the plain-text exposition a pull-based scraper
/// reads; everything else answers JSON. Both encodings are read-only views
/// of the same aggregator state.
pub async fn api_performance(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Query(params): Query<PerformanceQuery>,
) -> Response {
    if params.format.as_deref() == Some("prometheus") {
        return (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            state.telemetry.export_prometheus(),
        )
            .into_response();
    }

    let hours = clamp_hours(params.hours);
    let export = state.telemetry.export_json();

    Json(serde_json::json!({
        "timestamp": export["timestamp"],
        "metrics": export["metrics"],
        "overview": state.telemetry.overview(hours),
        "system": {
            "uptime_seconds": state.telemetry.uptime_seconds(),
            "started_at": state.telemetry.started_at().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
        },
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session_cookie_header;
    use crate::test_support::{test_router, TEST_SECRET};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[test]
    fn hours_clamped_to_range() {
        assert_eq!(clamp_hours(None), 24);
        assert_eq!(clamp_hours(Some(0)), 1);
        assert_eq!(clamp_hours(Some(12)), 12);
        assert_eq!(clamp_hours(Some(10_000)), 168);
    }

    #[tokio::test]
    async fn performance_requires_auth() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/performance")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn prometheus_format_is_plain_text() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/performance?format=prometheus")
                    .header(
                        axum::http::header::COOKIE,
                        session_cookie_header("admin_1", TEST_SECRET),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        assert!(content_type.starts_with("text/plain"));
    }

    #[tokio::test]
    async fn json_format_carries_expected_sections() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/performance?hours=6")
                    .header(
                        axum::http::header::COOKIE,
                        session_cookie_header("admin_1", TEST_SECRET),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["timestamp"].is_string());
        assert!(body["metrics"].is_object());
        assert_eq!(body["overview"]["window_hours"], 6);
        assert!(body["system"]["uptime_seconds"].is_number());
        assert!(body["system"]["version"].is_string());
    }
}
