use thiserror::Error;

/// Failures from a work-item backend. The dialog layer only cares that the
/// call failed; the variant is for the operator log.
#[derive(Debug, Error)]
pub enum WorkItemError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The request was refused before reaching the backend.
    #[error("invalid work item: {0}")]
    Invalid(String),

    /// The backend could not be reached or answered with an error.
    #[error("work item service unavailable: {0}")]
    Unavailable(String),

    #[error("work item store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, WorkItemError>;
