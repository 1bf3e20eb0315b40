//! Exponential backoff with full jitter (spec.md §4.1: "base 1s, factor 2,
//! cap 30s, full jitter").

use rand::Rng;
use std::time::Duration;

/// `min(base * 2^attempt, cap)`, then uniformly jittered down to zero.
pub fn full_jitter_backoff(attempt: u32, base_ms: u64, cap_ms: u64) -> Duration {
    let exp = base_ms.saturating_mul(1u64 << attempt.min(32)).min(cap_ms);
    let jittered = rand::thread_rng().gen_range(0..=exp.max(1));
    Duration::from_millis(jittered)
}

/// The default RPC backoff schedule: base 1s, cap 30s.
pub fn rpc_backoff(attempt: u32) -> Duration {
    full_jitter_backoff(attempt, 1_000, 30_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_cap() {
        for attempt in 0..20 {
            let d = rpc_backoff(attempt);
            assert!(d.as_millis() <= 30_000);
        }
    }
}
