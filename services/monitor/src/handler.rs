//! The generic seam every concrete monitor plugs into (spec.md §9:
//! "Dynamic method dispatch -> tagged variants... re-express as a Monitor
//! interface with three operations"). `EventMonitorDriver` owns the state
//! machine and cursor; a `RangeHandler` only knows how to turn a raw log
//! range into durable writes and, after those commit, semantic events.

use crate::error::MonitorError;
use async_trait::async_trait;
use ethers_core::types::{Address, Log, H256};
use store::{Batch, BatchOutcome};
use types::SemanticEvent;

/// What a handler produces for one processed range.
#[derive(Debug, Default)]
pub struct HandledRange {
    pub batch: Batch,
    pub semantic_events: Vec<SemanticEvent>,
}

#[async_trait]
pub trait RangeHandler: Send + Sync {
    /// Cursor name this handler owns, e.g. `"factory"`, `"dex:quickswap"`,
    /// `"transfer:0xabc..."` (spec.md §3 "Cursor").
    fn name(&self) -> &str;

    /// Address filter for `ChainClient::Logs`. May change between calls
    /// for handlers with a dynamically discovered address set
    /// (`DexMonitor`, `TransferMonitor`).
    fn addresses(&self) -> Vec<Address>;

    fn topics(&self) -> Vec<H256>;

    /// Split `addresses()` into chunks of at most this size before
    /// issuing `eth_getLogs` (spec.md §4.6: "batched in groups of 10
    /// addresses" for handlers with a large dynamic watch set). Handlers
    /// with a small, fixed address set never need this.
    fn address_chunk_size(&self) -> usize {
        usize::MAX
    }

    /// Decode `logs` (already filtered to `[from, to]`) into a batch of
    /// derived writes, in (block_number asc, log_index asc) order
    /// (spec.md §5). Must not perform any durable write itself — only
    /// the driver's `store.commit_batch` call does, atomically with the
    /// cursor advance.
    async fn handle_logs(
        &self,
        from: u64,
        to: u64,
        logs: Vec<Log>,
    ) -> Result<HandledRange, MonitorError>;

    /// Non-transactional side effects that only make sense once the batch
    /// is known to be durably committed (spec.md §4.4 step 5), beyond the
    /// semantic-event publish the driver already performs generically.
    async fn after_commit(&self, _handled: &HandledRange, _outcome: &BatchOutcome) {}
}
