//! Types for the activity store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for `list` when the caller doesn't ask for one.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Hard cap on `list` page size, regardless of the requested value.
pub const MAX_LIST_LIMIT: i64 = 200;

/// An activity as stored in Postgres. Returned by all read methods.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredActivity {
    pub id: Uuid,
    pub seq: i64,
    pub event_type: String,
    pub actor_id: Option<String>,
    pub project_id: Option<String>,
    pub comment_id: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// An activity to be appended. The caller builds this; the store assigns
/// id, seq, and created_at. `actor_id` is passed explicitly; `None` means
/// an anonymous event, which is permitted.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub event_type: String,
    pub actor_id: Option<String>,
    pub project_id: Option<String>,
    pub comment_id: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NewActivity {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            actor_id: None,
            project_id: None,
            comment_id: None,
            tag: None,
            metadata: None,
        }
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_comment(mut self, comment_id: impl Into<String>) -> Self {
        self.comment_id = Some(comment_id.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Filter for `list`. An absent `event_type` returns all types.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub event_type: Option<String>,
    pub limit: Option<i64>,
}

/// Clamp a requested page size to the valid range. Missing or non-positive
/// requests get the default.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    match requested {
        Some(n) if n > 0 => n.min(MAX_LIST_LIMIT),
        _ => DEFAULT_LIST_LIMIT,
    }
}
