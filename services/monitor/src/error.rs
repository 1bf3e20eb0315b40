//! Monitor-level error classification (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Chain(#[from] chain_client::ChainError),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// A single log failed to decode — logged and skipped, never aborts
    /// the containing range (spec.md §7 `Decode`).
    #[error("decode error: {0}")]
    Decode(String),

    /// `retry_attempts` exhausted for one block (spec.md §4.4): the
    /// monitor surfaces `BLOCK_PROCESSING_FAILED` and stops advancing
    /// past it.
    #[error("block {block} failed after {attempts} attempts")]
    BlockProcessingFailed { block: u64, attempts: u32 },

    /// Unrecoverable — the caller stops this monitor only; other monitors
    /// are unaffected (spec.md §7: "A failure in one monitor must not
    /// stop the others").
    #[error("fatal monitor error: {0}")]
    Fatal(String),
}

impl MonitorError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::Fatal(_) | MonitorError::BlockProcessingFailed { .. })
            || matches!(self, MonitorError::Chain(e) if !e.is_recoverable())
    }
}
