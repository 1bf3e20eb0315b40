//! Chain-level error classification (spec.md §7).

use thiserror::Error;

/// Errors `ChainClient` can return. Mirrors the abstract error kinds of
/// spec.md §7 that apply at the RPC boundary.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Network blip, provider hiccup — retry with backoff.
    #[error("transient RPC error: {0}")]
    Transient(String),

    /// Provider is rate limiting us — retry with backoff, log as warning.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// `eth_getLogs` range exceeded the provider's limit — caller must
    /// bisect and retry (spec.md §4.1, §4.4).
    #[error("requested range too large")]
    RangeTooLarge,

    /// `eth_call` reverted — caller substitutes a default value
    /// (spec.md §7 `ContractRevert`).
    #[error("contract call reverted: {0}")]
    ContractRevert(String),

    /// Unrecoverable — caller stops the affected monitor.
    #[error("fatal chain client error: {0}")]
    Fatal(String),
}

impl ChainError {
    /// Classify a provider error message using the phrasings real RPC
    /// providers use for "the range you asked for is too wide" and
    /// "you're going too fast" (grounded on the error-matching style
    /// common to production EVM indexers).
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        // Rate-limit phrasings are checked first: "limit exceeded" below
        // would otherwise also match a message like "rate limit exceeded"
        // and misclassify it as RangeTooLarge (spec.md §7 policy table).
        if lower.contains("429") || lower.contains("too many requests") || lower.contains("rate limit") {
            ChainError::RateLimited(message.to_string())
        } else if lower.contains("query returned more than")
            || lower.contains("block range")
            || lower.contains("-32005")
            || lower.contains("limit exceeded")
            || lower.contains("range too large")
        {
            ChainError::RangeTooLarge
        } else if lower.contains("revert") {
            ChainError::ContractRevert(message.to_string())
        } else if lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("reset")
            || lower.contains("broken pipe")
        {
            ChainError::Transient(message.to_string())
        } else {
            ChainError::Transient(message.to_string())
        }
    }

    /// Whether `EventMonitor` should retry locally (spec.md §7 policy
    /// table) rather than surface a `BLOCK_PROCESSING_FAILED` error event.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ChainError::Fatal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_exceeded_is_not_range_too_large() {
        assert!(matches!(ChainError::classify("rate limit exceeded"), ChainError::RateLimited(_)));
    }

    #[test]
    fn query_returned_more_than_is_range_too_large() {
        assert!(matches!(
            ChainError::classify("query returned more than 10000 results"),
            ChainError::RangeTooLarge
        ));
    }

    #[test]
    fn provider_limit_exceeded_without_rate_mention_is_range_too_large() {
        assert!(matches!(ChainError::classify("block range limit exceeded"), ChainError::RangeTooLarge));
    }
}
