//! MentionResolver: read-only candidate lookup over the external users
//! table, re-ranked in process.

use std::collections::HashSet;

use sqlx::PgPool;

use atelier_common::{AtelierError, Suggestion, UserRef};

use crate::ranking::{clamp_suggestion_limit, escape_like, rank_candidates, MAX_SUGGESTION_LIMIT};

/// How many candidate rows to fetch per cap unit. The in-process ranking
/// pass needs headroom beyond the final page so tier ordering isn't starved
/// by lexicographically-early substring matches.
const CANDIDATE_FACTOR: i64 = 3;

#[derive(Clone)]
pub struct MentionResolver {
    pool: PgPool,
}

impl MentionResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Suggest users for a partial handle. An empty or whitespace query
    /// returns an empty list without touching the database. `exclude_ids`
    /// members are guaranteed absent from the result; callers pass the
    /// requesting user's own id here. At most min(limit, 20) results.
    pub async fn suggest(
        &self,
        query: &str,
        limit: Option<i64>,
        exclude_ids: &[String],
    ) -> Result<Vec<Suggestion>, AtelierError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = clamp_suggestion_limit(limit);
        let escaped = escape_like(&query.to_lowercase());
        let prefix_pattern = format!("{escaped}%");
        let contains_pattern = format!("%{escaped}%");

        let candidates = sqlx::query_as::<_, UserRef>(
            r#"
            SELECT id, username, display_name, avatar_url
            FROM users
            WHERE (username ILIKE $1
                   OR (display_name IS NOT NULL AND display_name ILIKE $1))
              AND id <> ALL($2)
            ORDER BY
                CASE
                    WHEN lower(username) LIKE $3 THEN 0
                    WHEN lower(username) LIKE $1 THEN 1
                    ELSE 2
                END,
                lower(username) ASC,
                id ASC
            LIMIT $4
            "#,
        )
        .bind(&contains_pattern)
        .bind(exclude_ids)
        .bind(&prefix_pattern)
        .bind(MAX_SUGGESTION_LIMIT * CANDIDATE_FACTOR)
        .fetch_all(&self.pool)
        .await?;

        let exclude: HashSet<String> = exclude_ids.iter().cloned().collect();
        Ok(rank_candidates(query, candidates, &exclude, limit as usize))
    }
}
