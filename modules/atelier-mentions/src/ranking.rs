//! Deterministic ranking over candidate rows.
//!
//! Order: username prefix matches, then username substring matches, then
//! users matched only via display name. Ties break lexicographically on
//! the lowercased username, then on id, so identical inputs always produce
//! identical output.

use std::collections::HashSet;

use atelier_common::{Suggestion, UserRef};

/// Default suggestion count when the caller doesn't ask for one.
pub const DEFAULT_SUGGESTION_LIMIT: i64 = 10;

/// Hard cap on suggestions, regardless of the requested value.
pub const MAX_SUGGESTION_LIMIT: i64 = 20;

/// Clamp a requested suggestion count to the valid range.
pub fn clamp_suggestion_limit(requested: Option<i64>) -> i64 {
    match requested {
        Some(n) if n > 0 => n.min(MAX_SUGGESTION_LIMIT),
        _ => DEFAULT_SUGGESTION_LIMIT,
    }
}

/// Escape LIKE/ILIKE wildcards so a user-typed query matches literally.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if c == '%' || c == '_' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn match_tier(query_lower: &str, user: &UserRef) -> u8 {
    let username = user.username.to_lowercase();
    if username.starts_with(query_lower) {
        0
    } else if username.contains(query_lower) {
        1
    } else {
        // Reached the candidate set via display name only.
        2
    }
}

/// Rank candidate rows into the final suggestion list: drop excluded ids,
/// deduplicate by id, sort by match tier then username then id, truncate.
pub fn rank_candidates(
    query: &str,
    candidates: Vec<UserRef>,
    exclude_ids: &HashSet<String>,
    limit: usize,
) -> Vec<Suggestion> {
    let query_lower = query.to_lowercase();

    let mut seen = HashSet::new();
    let mut ranked: Vec<(u8, String, UserRef)> = candidates
        .into_iter()
        .filter(|u| !exclude_ids.contains(&u.id))
        .filter(|u| seen.insert(u.id.clone()))
        .map(|u| (match_tier(&query_lower, &u), u.username.to_lowercase(), u))
        .collect();

    ranked.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.id.cmp(&b.2.id))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, user)| Suggestion::from(user))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, username: &str, display_name: Option<&str>) -> UserRef {
        UserRef {
            id: id.to_string(),
            username: username.to_string(),
            display_name: display_name.map(|s| s.to_string()),
            avatar_url: None,
        }
    }

    #[test]
    fn clamp_caps_at_20() {
        assert_eq!(clamp_suggestion_limit(Some(100)), 20);
        assert_eq!(clamp_suggestion_limit(Some(20)), 20);
    }

    #[test]
    fn clamp_defaults_when_missing_or_invalid() {
        assert_eq!(clamp_suggestion_limit(None), 10);
        assert_eq!(clamp_suggestion_limit(Some(0)), 10);
        assert_eq!(clamp_suggestion_limit(Some(-3)), 10);
    }

    #[test]
    fn escape_handles_wildcards() {
        assert_eq!(escape_like("al"), "al");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn prefix_matches_rank_before_substring() {
        let candidates = vec![
            user("u2", "malbert", None),
            user("u1", "albert", None),
        ];
        let out = rank_candidates("al", candidates, &HashSet::new(), 10);
        assert_eq!(out[0].username, "albert");
        assert_eq!(out[1].username, "malbert");
    }

    #[test]
    fn display_name_only_matches_rank_last() {
        let candidates = vec![
            user("u3", "zorro", Some("Al Pacino")),
            user("u1", "albert", None),
        ];
        let out = rank_candidates("al", candidates, &HashSet::new(), 10);
        assert_eq!(out[0].username, "albert");
        assert_eq!(out[1].username, "zorro");
    }

    #[test]
    fn ties_break_lexicographically_then_by_id() {
        let candidates = vec![
            user("u2", "alice", None),
            user("u3", "albert", None),
            user("u1", "alice", None),
        ];
        let out = rank_candidates("al", candidates, &HashSet::new(), 10);
        assert_eq!(out[0].username, "albert");
        assert_eq!(out[1].id, "u1");
        assert_eq!(out[2].id, "u2");
    }

    #[test]
    fn excluded_ids_never_appear() {
        let candidates = vec![
            user("u1", "alice", None),
            user("u2", "albert", None),
        ];
        let exclude: HashSet<String> = ["u1".to_string()].into_iter().collect();
        let out = rank_candidates("al", candidates, &exclude, 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "u2");
    }

    #[test]
    fn duplicate_ids_are_deduplicated() {
        let candidates = vec![
            user("u1", "alice", None),
            user("u1", "alice", None),
        ];
        let out = rank_candidates("al", candidates, &HashSet::new(), 10);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn truncates_to_limit() {
        let candidates = (0..30)
            .map(|i| user(&format!("u{i:02}"), &format!("alice{i:02}"), None))
            .collect();
        let out = rank_candidates("alice", candidates, &HashSet::new(), 5);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let candidates = vec![user("u1", "Albert", None)];
        let out = rank_candidates("AL", candidates, &HashSet::new(), 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].username, "Albert");
    }
}
