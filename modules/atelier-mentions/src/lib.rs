//! Mention suggestion lookup.
//!
//! Read-only: given a partial handle, returns a ranked, deduplicated,
//! self-excluding list of candidate users. Never writes anything.

pub mod ranking;
pub mod resolver;

pub use ranking::{clamp_suggestion_limit, escape_like, rank_candidates};
pub use resolver::MentionResolver;
