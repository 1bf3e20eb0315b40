//! Per-monitor Prometheus counters (SPEC_FULL.md §2 ambient stack), the
//! `prometheus`-crate analogue of the teacher's `AdapterMetrics` —
//! `ranges_processed`/`ranges_failed`/`blocks_processed` replace the
//! teacher's `messages_received`/`messages_failed` pair, keyed by monitor
//! name instead of by adapter.

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts, Registry};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static RANGES_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("chainwatch_ranges_processed_total", "Block ranges committed successfully"),
        &["monitor"],
    )
    .expect("metric names are static and valid");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

static RANGES_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("chainwatch_ranges_failed_total", "Block ranges that exhausted their retry budget"),
        &["monitor"],
    )
    .expect("metric names are static and valid");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

static RANGE_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("chainwatch_range_retries_total", "processRange retry attempts, across all monitors"),
        &["monitor"],
    )
    .expect("metric names are static and valid");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

static BLOCKS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("chainwatch_blocks_processed_total", "Blocks folded into a committed range, across all monitors"),
        &["monitor"],
    )
    .expect("metric names are static and valid");
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

pub fn record_range_processed(monitor: &str, block_count: u64) {
    RANGES_PROCESSED.with_label_values(&[monitor]).inc();
    BLOCKS_PROCESSED.with_label_values(&[monitor]).inc_by(block_count);
}

pub fn record_range_failed(monitor: &str) {
    RANGES_FAILED.with_label_values(&[monitor]).inc();
}

pub fn record_range_retry(monitor: &str) {
    RANGE_RETRIES.with_label_values(&[monitor]).inc();
}

/// Render the process-wide registry in Prometheus text exposition format,
/// for the Supervisor's status snapshot (spec.md §7) to publish alongside
/// the plain JSON summary.
pub fn render() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_monitor_label() {
        record_range_processed("test-monitor", 7);
        record_range_failed("test-monitor");
        let rendered = render();
        assert!(rendered.contains("chainwatch_ranges_processed_total"));
        assert!(rendered.contains("monitor=\"test-monitor\""));
    }
}
