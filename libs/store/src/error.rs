//! Store-level error classification (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Lost the race for a write (unique violation racing a concurrent
    /// writer, serialization failure) — caller retries the transaction
    /// once, then surfaces (spec.md §7 `StoreConflict`).
    #[error("store write conflict: {0}")]
    Conflict(String),

    #[error("store row decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Sqlx(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
