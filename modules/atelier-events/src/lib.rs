//! Append-only activity store for the portfolio application.
//!
//! Stores immutable activity facts (publishes, likes, follows, shares, and
//! any free-form tag a client sends). Records are created once via append
//! and never mutated or deleted by this crate.

pub mod store;
pub mod types;

pub use store::ActivityStore;
pub use types::{clamp_limit, ListFilter, NewActivity, StoredActivity};
