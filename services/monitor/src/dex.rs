//! `DexMonitor` (spec.md §4.6): Uniswap V2-compatible pairs. Watches the
//! configured DEX factories for `PairCreated` and every pair it has
//! discovered so far for `Swap`/`Mint`/`Burn`/`Sync`, growing its address
//! set as new pairs appear.

use crate::decode::decode_logs;
use crate::error::MonitorError;
use crate::handler::{HandledRange, RangeHandler};
use crate::worker_pool::WorkerPool;
use async_trait::async_trait;
use chain_client::ChainClient;
use config::DexFactoryConfig;
use ethers_core::types::{Address, Log, H256, U256};
use kv::KvClient;
use parking_lot::RwLock;
use processors::{GasInfo, LiquidityProcessor, PriceProvider, TradeProcessor};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use store::BatchOutcome;
use tracing::{info, warn};
use types::{ChainEvent, Pair, SemanticEvent};

/// Addresses are chunked at this size when building `eth_getLogs` filters
/// (spec.md §4.6: "batched in groups of 10 addresses").
const ADDRESS_CHUNK_SIZE: usize = 10;

/// "Price per wei" of the base token, matching `trade_processor`'s
/// 18-decimal base-token assumption. The pool's non-base side has no
/// independent USD price here — deriving one from the pool itself would
/// be circular with the reserves we're recording — so it always prices
/// as zero (see DESIGN.md).
fn base_price_per_wei(base_token_price_usd: Decimal) -> Decimal {
    base_token_price_usd / Decimal::from(10u64.pow(18))
}

pub struct DexMonitor {
    chain: Arc<ChainClient>,
    kv: KvClient,
    dex_factories: Vec<DexFactoryConfig>,
    base_token: Address,
    trade_processor: TradeProcessor,
    price_provider: Arc<dyn PriceProvider>,
    /// Discovered pair addresses plus the last-seen reserves for each, so
    /// `Burn`/`Sync` handling within a batch has a "before" snapshot
    /// without re-reading the store mid-transaction.
    pairs: Arc<RwLock<HashMap<Address, (Address, Address)>>>,
    reserves: Arc<RwLock<HashMap<Address, (U256, U256)>>>,
}

impl DexMonitor {
    pub fn new(
        chain: Arc<ChainClient>,
        kv: KvClient,
        dex_factories: Vec<DexFactoryConfig>,
        base_token: Address,
        trade_processor: TradeProcessor,
        price_provider: Arc<dyn PriceProvider>,
        known_pairs: Vec<Pair>,
    ) -> Self {
        let mut pairs = HashMap::new();
        let mut reserves = HashMap::new();
        for pair in known_pairs {
            pairs.insert(pair.address, (pair.token0, pair.token1));
            reserves.insert(pair.address, (pair.reserve0, pair.reserve1));
        }
        Self {
            chain,
            kv,
            dex_factories,
            base_token,
            trade_processor,
            price_provider,
            pairs: Arc::new(RwLock::new(pairs)),
            reserves: Arc::new(RwLock::new(reserves)),
        }
    }

    fn factory_addresses(&self) -> Vec<Address> {
        self.dex_factories.iter().map(|f| f.address).collect()
    }

    /// `PairCreated` doesn't carry which configured factory emitted it
    /// once decoded; with a single configured factory (the common case)
    /// this is unambiguous. With more than one, the first entry is used
    /// and the pair is attributed conservatively (see DESIGN.md).
    fn dex_name(&self) -> String {
        self.dex_factories.first().map(|f| f.name.clone()).unwrap_or_else(|| "unknown".to_string())
    }

    /// Best-effort `Pair` snapshot for a `Swap` (reserves are kept
    /// in-memory, everything else from the discovery-time insert).
    fn pair_snapshot(&self, address: Address) -> Option<Pair> {
        let (token0, token1) = *self.pairs.read().get(&address)?;
        let (reserve0, reserve1) = self.reserves.read().get(&address).copied().unwrap_or_default();
        Some(Pair {
            address,
            token0,
            token1,
            reserve0,
            reserve1,
            dex_name: String::new(),
            created_at: 0,
            block_number: 0,
        })
    }

    /// The requested side's USD-per-wei price if it's the base token,
    /// else zero (see `base_price_per_wei`).
    fn price_for_side(&self, pair: Address, is_token0: bool, price_per_wei: Decimal) -> Decimal {
        let Some((token0, token1)) = self.pairs.read().get(&pair).copied() else {
            return Decimal::ZERO;
        };
        let side_is_base = if is_token0 { token0 == self.base_token } else { token1 == self.base_token };
        if side_is_base {
            price_per_wei
        } else {
            Decimal::ZERO
        }
    }
}

#[async_trait]
impl RangeHandler for DexMonitor {
    fn name(&self) -> &str {
        "dex"
    }

    fn addresses(&self) -> Vec<Address> {
        let mut addrs = self.factory_addresses();
        addrs.extend(self.pairs.read().keys().copied());
        addrs
    }

    fn topics(&self) -> Vec<H256> {
        chain_client::abi::dex::event_topics()
    }

    fn address_chunk_size(&self) -> usize {
        ADDRESS_CHUNK_SIZE
    }

    async fn handle_logs(&self, _from: u64, _to: u64, logs: Vec<Log>) -> Result<HandledRange, MonitorError> {
        let pool = WorkerPool::default_bound();
        let events = decode_logs(&self.chain, &pool, logs).await?;

        let mut handled = HandledRange::default();
        let base_price_usd = self.price_provider.base_token_price_usd().await;
        let price_per_wei = base_price_per_wei(base_price_usd);

        // Snapshot reserves once, before any `Sync` in this range mutates
        // `self.reserves` — a `Burn`'s `reserves_before` must reflect the
        // state prior to the range, not whatever a same-loop `Sync`
        // (which always precedes its paired `Burn`'s log index on a real
        // pair) already overwrote it with.
        let pre_range_reserves: HashMap<Address, (U256, U256)> = self.reserves.read().clone();

        for event in events {
            match event {
                ChainEvent::PairCreated(meta, mut created) => {
                    created.dex_name = self.dex_name();

                    let pair = Pair {
                        address: created.pair,
                        token0: created.token0,
                        token1: created.token1,
                        reserve0: U256::zero(),
                        reserve1: U256::zero(),
                        dex_name: created.dex_name.clone(),
                        created_at: meta.timestamp,
                        block_number: meta.block_number,
                    };

                    self.pairs.write().insert(pair.address, (pair.token0, pair.token1));
                    self.reserves.write().insert(pair.address, (pair.reserve0, pair.reserve1));

                    handled.batch.pairs.push(pair.clone());
                    for e in LiquidityProcessor::on_new_pair(&pair, self.base_token, meta.timestamp) {
                        if let SemanticEvent::AlertRaised(a) = &e {
                            handled.batch.alerts.push(a.clone());
                        }
                        handled.semantic_events.push(e);
                    }
                    info!(pair = %pair.address, dex = %pair.dex_name, "new pair discovered");
                }

                ChainEvent::Swap(meta, swap) => {
                    let Some(pair) = self.pair_snapshot(swap.pair) else {
                        warn!(pair = %swap.pair, "swap on unknown pair, skipping");
                        continue;
                    };
                    let gas = match pool.run(self.chain.transaction_receipt(meta.tx_hash)).await {
                        Some(receipt) => GasInfo {
                            gas_used: receipt.gas_used.map(|g| g.as_u64()),
                            gas_price_wei: receipt.effective_gas_price,
                        },
                        None => GasInfo { gas_used: None, gas_price_wei: None },
                    };
                    let (trade, events) = self
                        .trade_processor
                        .process(&swap, meta, &pair, swap.to, base_price_usd, gas)
                        .await;
                    for e in &events {
                        if let SemanticEvent::AlertRaised(a) = e {
                            handled.batch.alerts.push(a.clone());
                        }
                    }
                    self.trade_processor.publish_trade_recent(swap.pair, &trade).await;
                    handled.batch.trades.push(trade);
                    handled.semantic_events.extend(events);
                }

                ChainEvent::Mint(meta, mint) => {
                    let token0_price = self.price_for_side(mint.pair, true, price_per_wei);
                    let token1_price = self.price_for_side(mint.pair, false, price_per_wei);
                    let (event, events) = LiquidityProcessor::on_mint(
                        &mint,
                        meta,
                        token0_price,
                        token1_price,
                        mint.amount0.saturating_add(mint.amount1),
                    );
                    for e in &events {
                        if let SemanticEvent::AlertRaised(a) = e {
                            handled.batch.alerts.push(a.clone());
                        }
                    }
                    handled.batch.liquidity_events.push(event);
                    handled.semantic_events.extend(events);
                }

                ChainEvent::Burn(meta, burn) => {
                    let reserves_before =
                        pre_range_reserves.get(&burn.pair).copied().unwrap_or((U256::zero(), U256::zero()));
                    let token0_price = self.price_for_side(burn.pair, true, price_per_wei);
                    let token1_price = self.price_for_side(burn.pair, false, price_per_wei);
                    let (event, events) = LiquidityProcessor::on_burn(
                        &burn,
                        meta,
                        reserves_before,
                        token0_price,
                        token1_price,
                        burn.amount0.saturating_add(burn.amount1),
                    );
                    for e in &events {
                        if let SemanticEvent::AlertRaised(a) = e {
                            handled.batch.alerts.push(a.clone());
                        }
                    }
                    handled.batch.liquidity_events.push(event);
                    handled.semantic_events.extend(events);
                }

                ChainEvent::Sync(_meta, sync) => {
                    let previous = self.reserves.read().get(&sync.pair).copied();
                    if let Some(shift) = LiquidityProcessor::on_sync(&sync, previous) {
                        warn!(pair = %sync.pair, shift_pct = shift, "significant reserve shift");
                    }
                    self.reserves.write().insert(sync.pair, (sync.reserve0, sync.reserve1));
                    handled.batch.pair_reserve_updates.push((sync.pair, sync.reserve0, sync.reserve1));
                }

                _ => {}
            }
        }

        Ok(handled)
    }

    async fn after_commit(&self, handled: &HandledRange, _outcome: &BatchOutcome) {
        for pair in &handled.batch.pairs {
            let _ = self.kv.sadd(&kv::channels::pairs_by_dex(&pair.dex_name), &types::addr_key(pair.address)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_price_per_wei_scales_down_by_18_decimals() {
        let price = base_price_per_wei(Decimal::from(2000));
        assert!(price < Decimal::new(1, 10));
    }
}
