use thiserror::Error;

/// Errors raised while reading or committing conversation/user state.
#[derive(Debug, Error)]
pub enum StateError {
    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A record could not be encoded to or decoded from JSON.
    #[error("serialization error for {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A thread panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StateError>;
