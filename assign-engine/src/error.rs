use domain::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("transaction begin/commit failed: {0}")]
    Transaction(#[from] sqlx::Error),

    #[error("reassignment target {0} is not an active caller")]
    InactiveTarget(domain::CallerId),

    #[error("no assignment exists for lead {0}")]
    NoSuchAssignment(domain::LeadId),

    #[error("transient conflict persisted past {0} retries")]
    TransientConflictExhausted(u32),
}
