use serde::{Deserialize, Serialize};

// --- Activity kinds ---

/// The well-known activity tags. Free-form event types are also legal
/// (the store persists any non-empty string), but callers inside the
/// application should prefer these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Publish,
    Like,
    Save,
    Comment,
    Reply,
    Follow,
    TagFollow,
    Share,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Publish => "PUBLISH",
            ActivityKind::Like => "LIKE",
            ActivityKind::Save => "SAVE",
            ActivityKind::Comment => "COMMENT",
            ActivityKind::Reply => "REPLY",
            ActivityKind::Follow => "FOLLOW",
            ActivityKind::TagFollow => "TAG_FOLLOW",
            ActivityKind::Share => "SHARE",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- User projection ---

/// Read-only subset of the externally-owned users table. This core never
/// writes to it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A mention suggestion as returned to clients. `name` falls back to the
/// username when the user has no display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<UserRef> for Suggestion {
    fn from(user: UserRef) -> Self {
        let name = user
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.username.clone());
        Suggestion {
            id: user.id,
            username: user.username,
            name,
            avatar: user.avatar_url,
        }
    }
}
