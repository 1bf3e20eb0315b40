//! `EventMonitorDriver`: the shared cursor, state machine, and
//! `processRange` algorithm every concrete monitor runs through a
//! [`RangeHandler`] (spec.md §4.4).

use crate::error::MonitorError;
use crate::handler::RangeHandler;
use crate::publish::publish_all;
use crate::state::MonitorState;
use crate::worker_pool::WorkerPool;
use chain_client::{ChainClient, ChainError};
use ethers_core::types::{Address, Log, H256};
use kv::KvClient;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use store::Store;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Blocks behind head considered safe from reorgs (spec.md §4.4,
    /// default 3).
    pub confirmations: u64,
    /// Historical catch-up window size, in blocks (spec.md §6, default
    /// 100).
    pub batch_size: u64,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub start_block: Option<u64>,
    /// Poll cadence when no streaming subscription is available, or as
    /// the concurrent gap-filling poll alongside a live subscription
    /// (spec.md §4.4, 5s).
    pub poll_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            confirmations: 3,
            batch_size: 100,
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
            start_block: None,
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Snapshot of a single monitor's health, read by the Supervisor's
/// once-a-minute status broadcast (spec.md §7).
#[derive(Debug, Clone)]
pub struct MonitorStatus {
    pub running: bool,
    pub state: MonitorState,
    pub last_processed_block: u64,
    pub last_error: Option<String>,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            running: false,
            state: MonitorState::Init,
            last_processed_block: 0,
            last_error: None,
        }
    }
}

pub struct EventMonitorDriver<H: RangeHandler> {
    chain: Arc<ChainClient>,
    store: Store,
    kv: KvClient,
    handler: H,
    config: DriverConfig,
    pool: WorkerPool,
    status: Arc<RwLock<MonitorStatus>>,
}

impl<H: RangeHandler> EventMonitorDriver<H> {
    pub fn new(
        chain: Arc<ChainClient>,
        store: Store,
        kv: KvClient,
        handler: H,
        config: DriverConfig,
    ) -> Self {
        Self {
            chain,
            store,
            kv,
            handler,
            config,
            pool: WorkerPool::default_bound(),
            status: Arc::new(RwLock::new(MonitorStatus::default())),
        }
    }

    pub fn status(&self) -> Arc<RwLock<MonitorStatus>> {
        self.status.clone()
    }

    pub fn worker_pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Drives `INIT -> CATCHING_UP -> LIVE [-> RECONNECTING -> LIVE]*`
    /// until `shutdown` fires or a fatal error occurs.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), MonitorError> {
        self.set_state(MonitorState::Init);
        self.status.write().running = true;

        let mut cursor = self.load_initial_cursor().await?;
        info!(monitor = self.handler.name(), cursor, "loaded cursor");

        self.set_state(MonitorState::CatchingUp);
        loop {
            if shutdown.try_recv().is_ok() {
                return self.stop_gracefully().await;
            }
            let head = self.chain.head_block().await.map_err(MonitorError::from)?;
            let safe_head = head.saturating_sub(self.config.confirmations);
            if cursor >= safe_head {
                break;
            }
            let to = (cursor + self.config.batch_size).min(safe_head);
            self.process_range_with_retry(cursor + 1, to).await?;
            cursor = to;
        }

        self.set_state(MonitorState::Live);
        self.run_live(cursor, shutdown).await
    }

    async fn load_initial_cursor(&self) -> Result<u64, MonitorError> {
        if let Some(cursor) = self.store.cursor_for(self.handler.name()).await? {
            return Ok(cursor.last_block);
        }
        if let Some(start) = self.config.start_block {
            return Ok(start.saturating_sub(1));
        }
        let head = self.chain.head_block().await?;
        Ok(head.saturating_sub(1000))
    }

    async fn run_live(
        &self,
        mut cursor: u64,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), MonitorError> {
        let mut heads = self.chain.subscribe_heads().await;
        let mut poll = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    return self.stop_gracefully().await;
                }
                _ = poll.tick() => {
                    cursor = self.catch_up_to_head(cursor).await?;
                }
                head = recv_head(&mut heads) => {
                    match head {
                        Some(h) => {
                            let safe = h.saturating_sub(self.config.confirmations);
                            if safe > cursor {
                                self.process_range_with_retry(cursor + 1, safe).await?;
                                cursor = safe;
                            }
                        }
                        None => {
                            // Streaming exhausted its reconnect budget
                            // (chain-client degrades to polling); keep
                            // running off the poll ticker alone.
                            self.set_state(MonitorState::Reconnecting);
                            heads = None;
                            self.set_state(MonitorState::Live);
                        }
                    }
                }
            }
        }
    }

    async fn catch_up_to_head(&self, cursor: u64) -> Result<u64, MonitorError> {
        let head = self.chain.head_block().await?;
        let safe_head = head.saturating_sub(self.config.confirmations);
        if safe_head > cursor {
            self.process_range_with_retry(cursor + 1, safe_head).await?;
            Ok(safe_head)
        } else {
            Ok(cursor)
        }
    }

    async fn stop_gracefully(&self) -> Result<(), MonitorError> {
        info!(monitor = self.handler.name(), "stopping monitor");
        self.set_state(MonitorState::Stopped);
        self.status.write().running = false;
        Ok(())
    }

    /// `processRange(from, to)` (spec.md §4.4), with the per-range retry
    /// counter capped at `retry_attempts`.
    async fn process_range_with_retry(&self, from: u64, to: u64) -> Result<(), MonitorError> {
        let mut attempt = 0u32;
        loop {
            match self.process_range(from, to).await {
                Ok(()) => {
                    self.status.write().last_processed_block = to;
                    crate::metrics::record_range_processed(self.handler.name(), to.saturating_sub(from) + 1);
                    return Ok(());
                }
                Err(e) if attempt >= self.config.retry_attempts => {
                    let failure = MonitorError::BlockProcessingFailed { block: to, attempts: attempt };
                    error!(monitor = self.handler.name(), from, to, attempt, error = %e, "giving up on range");
                    self.status.write().last_error = Some(failure.to_string());
                    crate::metrics::record_range_failed(self.handler.name());
                    return Err(failure);
                }
                Err(e) => {
                    warn!(monitor = self.handler.name(), from, to, attempt, error = %e, "retrying range");
                    crate::metrics::record_range_retry(self.handler.name());
                    let delay = self.config.retry_delay * 2u32.pow(attempt.min(10));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn process_range(&self, from: u64, to: u64) -> Result<(), MonitorError> {
        let addresses = self.handler.addresses();
        let topics = self.handler.topics();
        let chunk_size = self.handler.address_chunk_size();

        let mut logs = Vec::new();
        if addresses.is_empty() {
            logs = fetch_logs_bisected(&self.chain, from, to, addresses, topics).await?;
        } else {
            for chunk in addresses.chunks(chunk_size.max(1)) {
                let mut batch =
                    fetch_logs_bisected(&self.chain, from, to, chunk.to_vec(), topics.clone()).await?;
                logs.append(&mut batch);
            }
            logs.sort_by_key(|l| (l.block_number, l.log_index));
        }

        let handled = self.handler.handle_logs(from, to, logs).await?;
        let outcome = self
            .store
            .commit_batch(self.handler.name(), to, handled.batch)
            .await?;

        publish_all(&self.kv, &handled.semantic_events).await;
        self.handler.after_commit(&handled, &outcome).await;

        Ok(())
    }

    fn set_state(&self, state: MonitorState) {
        info!(monitor = self.handler.name(), state = %state, "monitor state transition");
        self.status.write().state = state;
    }
}

async fn recv_head(rx: &mut Option<tokio::sync::mpsc::Receiver<u64>>) -> Option<u64> {
    match rx {
        Some(r) => r.recv().await,
        None => std::future::pending().await,
    }
}

/// Fetch logs for `[from, to]`, bisecting on `RangeTooLarge` (spec.md
/// §4.4 step 2). `from == to` with `RangeTooLarge` cannot be bisected
/// further and escalates to fatal (spec.md §8 boundary case).
async fn fetch_logs_bisected(
    chain: &ChainClient,
    from: u64,
    to: u64,
    addresses: Vec<Address>,
    topics: Vec<H256>,
) -> Result<Vec<Log>, MonitorError> {
    let mut logs = Vec::new();
    let mut stack = vec![(from, to)];
    // Process sub-ranges low-to-high so `logs` stays in block order;
    // each split pushes the high half first so the low half pops next.
    while let Some((lo, hi)) = stack.pop() {
        match chain.logs(lo, hi, addresses.clone(), topics.clone()).await {
            Ok(mut batch) => logs.append(&mut batch),
            Err(ChainError::RangeTooLarge) if hi > lo => {
                let mid = lo + (hi - lo) / 2;
                stack.push((mid + 1, hi));
                stack.push((lo, mid));
            }
            Err(ChainError::RangeTooLarge) => {
                return Err(MonitorError::Fatal(format!(
                    "range too large at single block {lo}, cannot bisect further"
                )));
            }
            Err(e) => return Err(MonitorError::from(e)),
        }
    }
    logs.sort_by_key(|l| (l.block_number, l.log_index));
    Ok(logs)
}
