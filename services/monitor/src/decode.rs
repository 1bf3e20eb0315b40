//! Shared log decoding: resolves per-block timestamps once per distinct
//! block in a range, then dispatches each log through `chain_client`'s ABI
//! tables (spec.md §4.2).

use crate::error::MonitorError;
use crate::worker_pool::WorkerPool;
use chain_client::ChainClient;
use ethers_core::types::Log;
use std::collections::HashMap;
use tracing::warn;
use types::ChainEvent;

/// Decode every log in `logs` into a `ChainEvent`, resolving block
/// timestamps once per distinct block number through `pool` (spec.md
/// §4.2: "block timestamps are resolved per-batch"). A log with an
/// unrecognised topic0 or malformed ABI payload is skipped with a warning
/// rather than failing the whole range (spec.md §7 `Decode`).
pub async fn decode_logs(
    chain: &ChainClient,
    pool: &WorkerPool,
    logs: Vec<Log>,
) -> Result<Vec<ChainEvent>, MonitorError> {
    let mut block_numbers: Vec<u64> = logs
        .iter()
        .filter_map(|l| l.block_number)
        .map(|b| b.as_u64())
        .collect();
    block_numbers.sort_unstable();
    block_numbers.dedup();

    let mut timestamps = HashMap::with_capacity(block_numbers.len());
    for block_number in block_numbers {
        let ts = pool.run(chain.block_timestamp(block_number)).await?;
        timestamps.insert(block_number, ts);
    }

    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        let block_number = match log.block_number {
            Some(b) => b.as_u64(),
            None => {
                warn!("log missing block_number, skipping");
                continue;
            }
        };
        let timestamp = *timestamps.get(&block_number).unwrap_or(&0);

        let topic0 = match chain_client::topic0_of(&log) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "log has no topics, skipping");
                continue;
            }
        };

        let Some(decoder) = chain_client::decoder_for(topic0) else {
            continue;
        };

        match decoder(&log, timestamp) {
            Ok(event) => events.push(event),
            Err(e) => warn!(error = %e, tx_hash = ?log.transaction_hash, "failed to decode log, skipping"),
        }
    }

    Ok(events)
}
