//! KV-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KvError>;
