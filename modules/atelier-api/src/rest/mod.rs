pub mod admin;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

use atelier_common::AtelierError;
use atelier_events::{ListFilter, NewActivity};

use crate::auth::{MaybeSession, Session};
use crate::error::ApiError;
use crate::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(rename = "type")]
    event_type: Option<String>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    q: Option<String>,
    limit: Option<i64>,
}

// --- Rate limiting ---

pub const RATE_LIMIT_PER_HOUR: usize = 60;

/// Check rate limit for an IP. Returns true if the request is allowed, false if rate-limited.
/// Prunes expired entries and records the new request if allowed.
pub fn check_rate_limit(entries: &mut Vec<Instant>, now: Instant, max_per_hour: usize) -> bool {
    let cutoff = now - std::time::Duration::from_secs(3600);
    entries.retain(|t| *t > cutoff);
    if entries.len() >= max_per_hour {
        return false;
    }
    entries.push(now);
    true
}

/// Prune empty entries from the rate limiter HashMap to prevent unbounded growth.
pub fn prune_empty_entries(
    limiter: &mut std::collections::HashMap<std::net::IpAddr, Vec<Instant>>,
) {
    let cutoff = Instant::now() - std::time::Duration::from_secs(3600);
    limiter.retain(|_, entries| {
        entries.retain(|t| *t > cutoff);
        !entries.is_empty()
    });
}

// --- Handlers ---

/// POST /events. The actor is taken from the session when one is present;
/// anonymous events are permitted and recorded with a null actor. The body
/// never supplies the actor.
pub async fn api_log_event(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    MaybeSession(actor): MaybeSession,
    Json(body): Json<serde_json::Value>,
) -> Response {
    // Public write endpoint: per-IP rate limit
    let ip = addr.ip();
    {
        let mut limiter = state.rate_limiter.lock().await;
        // Periodically prune empty entries to prevent unbounded HashMap growth
        if limiter.len() > 1000 {
            prune_empty_entries(&mut limiter);
        }
        let entries = limiter.entry(ip).or_default();
        if !check_rate_limit(entries, Instant::now(), RATE_LIMIT_PER_HOUR) {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "success": false,
                    "error": "rate limit exceeded: max 60 events per hour",
                })),
            )
                .into_response();
        }
    }

    let event_type = match body.get("type") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => {
            return ApiError(AtelierError::Validation(
                "type is required and must be a non-empty string".to_string(),
            ))
            .into_response();
        }
    };

    let str_field = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);

    let activity = NewActivity {
        event_type: event_type.clone(),
        actor_id: actor,
        project_id: str_field("projectId"),
        comment_id: str_field("commentId"),
        tag: str_field("tag"),
        metadata: body.get("metadata").filter(|v| !v.is_null()).cloned(),
    };

    match state.events.append(activity).await {
        Ok(()) => {
            state.telemetry.record("events.append", 1.0);
            state
                .telemetry
                .record(&format!("events.append.{}", event_type.to_lowercase()), 1.0);
            Json(serde_json::json!({ "success": true })).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// GET /events?type=&limit=, newest first. The page size defaults to 50
/// and is capped at 200 inside the store.
pub async fn api_list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Response {
    let filter = ListFilter {
        event_type: params.event_type.filter(|t| !t.is_empty()),
        limit: params.limit,
    };

    match state.events.list(filter).await {
        Ok(data) => Json(serde_json::json!({ "success": true, "data": data })).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// GET /mentions/suggestions?q=&limit=, authenticated callers only. The
/// requester's own id is always excluded so users can't mention themselves.
pub async fn api_mention_suggestions(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<SuggestionsQuery>,
) -> Response {
    let q = params.q.unwrap_or_default();
    let exclude = vec![session.user_id];

    match state.mentions.suggest(&q, params.limit, &exclude).await {
        Ok(suggestions) => {
            Json(serde_json::json!({ "suggestions": suggestions })).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}
