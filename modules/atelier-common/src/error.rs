use thiserror::Error;

/// Error taxonomy for the activity core. The HTTP boundary owns the mapping
/// to status codes; internal detail stays server-side.
#[derive(Error, Debug)]
pub enum AtelierError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AtelierError {
    fn from(e: sqlx::Error) -> Self {
        AtelierError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for AtelierError {
    fn from(e: anyhow::Error) -> Self {
        AtelierError::Internal(e.to_string())
    }
}
