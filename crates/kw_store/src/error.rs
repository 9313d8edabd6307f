use thiserror::Error;

/// Errors surfaced by every storage engine.
///
/// `NotFound` covers both "no such record" and "record owned by a
/// different account": callers must not be able to tell the two apart,
/// or the existence of another tenant's data becomes observable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Refresh token mismatch")]
    Unauthorized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
