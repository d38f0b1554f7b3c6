//! Error types for the userbase-accounts crate.
//!
//! All storage operations return [`AccountError`] via [`AccountResult`].
//! Uses `thiserror` for ergonomic, zero-cost error definitions.
//!
//! Only registration surfaces these errors directly; lookup and mutation
//! operations flatten them to `Option`/`bool` at the public API after
//! logging the structured cause.

use thiserror::Error;

/// Alias for `Result<T, AccountError>`.
pub type AccountResult<T> = Result<T, AccountError>;

/// Errors that can occur in the account store.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The store cannot be constructed: missing/empty secret or an
    /// unusable backing table location.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Registration of an id that already exists after normalization.
    #[error("account already exists: {0}")]
    AlreadyExists(String),

    /// A full-item write was rejected by the backing table.
    #[error("persist failed: {0}")]
    PersistFailed(String),

    /// The requested account has no stored record.
    #[error("account not found: {0}")]
    NotFound(String),

    /// A stored record exists but one of its JSON blobs does not decode.
    #[error("corrupt record for account {uid}: {source}")]
    Corrupt {
        uid: String,
        source: serde_json::Error,
    },

    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for AccountError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
