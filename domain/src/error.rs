use thiserror::Error;

/// Errors a persistence adapter can raise. Kept separate from `EngineError`
/// so the engine crate doesn't have to depend on `sqlx` directly.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("no such caller")]
    CallerNotFound,

    #[error("no such lead")]
    LeadNotFound,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
