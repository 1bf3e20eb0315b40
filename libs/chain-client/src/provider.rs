//! `ChainClient`: a thin, retrying wrapper over an `ethers` JSON-RPC
//! provider plus an optional streaming subscription (spec.md §4.1).

use crate::backoff::rpc_backoff;
use crate::error::ChainError;
use ethers::prelude::*;
use ethers_core::types::{Address, Bytes, Filter, Log, TransactionReceipt, H256, U64};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration for a `ChainClient` instance.
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    pub rpc_url: String,
    pub ws_url: Option<String>,
    /// Internal retry attempts for `Transient`/`RateLimited` errors before
    /// a call is surfaced as `Fatal` (spec.md §7).
    pub retry_attempts: u32,
    /// Per-call timeout for `Call` (spec.md §4.1, default 10s).
    pub call_timeout: Duration,
    /// Ceiling on reconnect attempts for the streaming subscription
    /// (spec.md §4.1: "max 10").
    pub max_reconnect_attempts: u32,
    /// Ceiling on reconnect backoff (spec.md §4.1: "30s ceiling").
    pub reconnect_backoff_cap: Duration,
}

impl ChainClientConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ws_url: None,
            retry_attempts: 3,
            call_timeout: Duration::from_secs(10),
            max_reconnect_attempts: 10,
            reconnect_backoff_cap: Duration::from_secs(30),
        }
    }
}

/// Wraps an HTTP provider for polling and an optional WS provider for
/// head/log subscriptions.
pub struct ChainClient {
    http: Arc<Provider<Http>>,
    ws_url: Option<String>,
    config: ChainClientConfig,
}

impl ChainClient {
    pub fn new(config: ChainClientConfig) -> Result<Self, ChainError> {
        let http = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainError::Fatal(format!("invalid rpc_url: {e}")))?;
        Ok(Self {
            http: Arc::new(http),
            ws_url: config.ws_url.clone(),
            config,
        })
    }

    /// `HeadBlock() -> u64` (spec.md §4.1).
    pub async fn head_block(&self) -> Result<u64, ChainError> {
        self.with_retry("head_block", || async {
            self.http
                .get_block_number()
                .await
                .map(|n| n.as_u64())
                .map_err(|e| ChainError::classify(&e.to_string()))
        })
        .await
    }

    /// Block timestamp, used to resolve `LogMeta::timestamp` for every log
    /// in a processed range (spec.md §4.2: "block timestamps are resolved
    /// per-batch").
    pub async fn block_timestamp(&self, block_number: u64) -> Result<i64, ChainError> {
        self.with_retry("block_timestamp", || async {
            let block = self
                .http
                .get_block(block_number)
                .await
                .map_err(|e| ChainError::classify(&e.to_string()))?
                .ok_or_else(|| ChainError::Transient(format!("block {block_number} not found")))?;
            Ok(block.timestamp.as_u64() as i64)
        })
        .await
    }

    /// `Logs(from, to, addresses, topics) -> []Log` (spec.md §4.1). Does
    /// not retry `RangeTooLarge` — that is bisected by the caller
    /// (spec.md §4.4 `processRange`).
    pub async fn logs(
        &self,
        from: u64,
        to: u64,
        addresses: Vec<Address>,
        topics: Vec<H256>,
    ) -> Result<Vec<Log>, ChainError> {
        let mut filter = Filter::new()
            .from_block(U64::from(from))
            .to_block(U64::from(to));
        if !addresses.is_empty() {
            filter = filter.address(addresses);
        }
        if !topics.is_empty() {
            filter = filter.topic0(topics);
        }

        let mut attempt = 0u32;
        loop {
            match self.http.get_logs(&filter).await {
                Ok(logs) => return Ok(logs),
                Err(e) => {
                    let classified = ChainError::classify(&e.to_string());
                    if matches!(classified, ChainError::RangeTooLarge) {
                        return Err(classified);
                    }
                    if attempt >= self.config.retry_attempts || !classified.is_recoverable() {
                        return Err(ChainError::Fatal(format!(
                            "logs({from}, {to}) failed after {attempt} retries: {classified}"
                        )));
                    }
                    warn!(from, to, attempt, error = %classified, "retrying eth_getLogs");
                    tokio::time::sleep(rpc_backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// `Call(addr, data, block?) -> bytes` with a per-call timeout
    /// (spec.md §4.1).
    pub async fn call(
        &self,
        to: Address,
        data: Bytes,
        block: Option<u64>,
    ) -> Result<Bytes, ChainError> {
        let mut tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        tx.set_to(to);
        let block_id = block.map(|b| BlockId::Number(BlockNumber::Number(b.into())));

        let fut = self.http.call(&tx, block_id);
        match tokio::time::timeout(self.config.call_timeout, fut).await {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(ChainError::classify(&e.to_string())),
            Err(_) => Err(ChainError::Transient("eth_call timed out".to_string())),
        }
    }

    /// `eth_getTransactionReceipt` (spec.md §4.9 "fetch receipt for gas",
    /// §6). Gas fields are best-effort enrichment, not part of any
    /// invariant, so a failure here degrades to `None` rather than failing
    /// the trade that needed it — the same failure-tolerant shape
    /// `processors::ContractReader` uses for enrichment reads.
    pub async fn transaction_receipt(&self, tx_hash: H256) -> Option<TransactionReceipt> {
        let result = self
            .with_retry("transaction_receipt", || async {
                self.http
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(|e| ChainError::classify(&e.to_string()))
            })
            .await;

        match result {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(tx_hash = ?tx_hash, error = %e, "failed to fetch transaction receipt");
                None
            }
        }
    }

    /// `SubscribeHeads() -> stream<u64>` when a streaming endpoint is
    /// configured, else `None` (spec.md §4.1). Reconnects transparently up
    /// to `max_reconnect_attempts`; once exhausted the channel closes and
    /// the caller should fall back to polling (spec.md §4.4 `LIVE` state).
    pub async fn subscribe_heads(&self) -> Option<mpsc::Receiver<u64>> {
        let ws_url = self.ws_url.clone()?;
        let (tx, rx) = mpsc::channel(64);
        let max_attempts = self.config.max_reconnect_attempts;
        let backoff_cap = self.config.reconnect_backoff_cap;

        tokio::spawn(async move {
            let mut attempt = 0u32;
            loop {
                match Provider::<Ws>::connect(&ws_url).await {
                    Ok(provider) => {
                        attempt = 0;
                        info!(ws_url = %ws_url, "subscribed to new heads");
                        let mut stream = match provider.subscribe_blocks().await {
                            Ok(s) => s,
                            Err(e) => {
                                warn!(error = %e, "subscribe_blocks failed");
                                attempt += 1;
                                if attempt > max_attempts {
                                    break;
                                }
                                tokio::time::sleep(backoff_for(attempt, backoff_cap)).await;
                                continue;
                            }
                        };
                        while let Some(block) = stream.next().await {
                            if let Some(number) = block.number {
                                if tx.send(number.as_u64()).await.is_err() {
                                    debug!("head subscriber dropped, stopping reconnect loop");
                                    return;
                                }
                            }
                        }
                        warn!("head subscription stream ended, reconnecting");
                    }
                    Err(e) => {
                        warn!(error = %e, attempt, "failed to connect websocket provider");
                    }
                }

                attempt += 1;
                if attempt > max_attempts {
                    warn!(max_attempts, "exhausted websocket reconnect attempts, degrading to polling");
                    break;
                }
                tokio::time::sleep(backoff_for(attempt, backoff_cap)).await;
            }
        });

        Some(rx)
    }
}

fn backoff_for(attempt: u32, cap: Duration) -> Duration {
    crate::backoff::full_jitter_backoff(attempt, 1_000, cap.as_millis() as u64)
}

impl ChainClient {
    async fn with_retry<F, Fut, T>(&self, op: &str, f: F) -> Result<T, ChainError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, ChainError>>,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_recoverable() && attempt < self.config.retry_attempts => {
                    warn!(op, attempt, error = %e, "retrying RPC call");
                    tokio::time::sleep(rpc_backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
