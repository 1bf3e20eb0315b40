//! `TradeProcessor` (spec.md §4.9): price impact, USD classification,
//! rolling volume, trader whale tracking.

use amm::price_impact_pct;
use ethers_core::types::{Address, U256};
use kv::{channels, KvClient};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use types::{Alert, AlertSeverity, AlertType, LogMeta, Pair, SemanticEvent, SwapEvent, Trade};

/// Assumed decimals for the base (wrapped-native) token when converting a
/// raw `U256` amount to a human-scale `Decimal` for USD valuation. Every
/// base token this system is configured against is an 18-decimal wrapped
/// native asset; a token-specific decimals lookup would be needed to
/// support others.
const BASE_TOKEN_DECIMALS: u32 = 18;

pub const WHALE_USD: f64 = 500.0;
pub const LARGE_USD: f64 = 100.0;
const WHALE_PRICE_IMPACT_PCT: f64 = 10.0;
pub const WHALE_CUMULATIVE_VOLUME_USD: i64 = 100_000;

const HOURLY_WINDOW_SECS: i64 = 3_600;
const DAILY_WINDOW_SECS: i64 = 86_400;

pub struct TradeProcessor {
    kv: KvClient,
    base_token: Address,
}

pub struct GasInfo {
    pub gas_used: Option<u64>,
    pub gas_price_wei: Option<U256>,
}

/// Per-trader rolling profile (spec.md §4.9: "counters, avg size,
/// first/last seen"). Lives in KV, not the durable data model — spec.md §3
/// has no table for it, so like the rest of the derived state it is a
/// projection, rebuilt from zero if ever evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderProfile {
    pub trade_count: u64,
    pub cumulative_volume_usd: f64,
    pub average_trade_usd: f64,
    /// Unix seconds.
    pub first_seen: i64,
    /// Unix seconds.
    pub last_seen: i64,
}

impl TraderProfile {
    fn new(timestamp: i64) -> Self {
        Self { trade_count: 0, cumulative_volume_usd: 0.0, average_trade_usd: 0.0, first_seen: timestamp, last_seen: timestamp }
    }

    fn record(&mut self, usd_value: f64, timestamp: i64) {
        self.trade_count += 1;
        self.cumulative_volume_usd += usd_value;
        self.average_trade_usd = self.cumulative_volume_usd / self.trade_count as f64;
        self.last_seen = timestamp;
    }
}

impl TradeProcessor {
    pub fn new(kv: KvClient, base_token: Address) -> Self {
        Self { kv, base_token }
    }

    /// Build the `Trade` row, classify it, fold in the cumulative
    /// trader-volume whale check, update the rolling pair/token volume
    /// windows, and fold in the `websocket:price_update` event (spec.md
    /// §4.9).
    pub async fn process(
        &self,
        swap: &SwapEvent,
        meta: LogMeta,
        pair: &Pair,
        trader: Address,
        base_token_price_usd: Decimal,
        gas: GasInfo,
    ) -> (Trade, Vec<SemanticEvent>) {
        let (trade, usd_value, mut events) =
            classify_trade(self.base_token, swap, meta, pair, trader, base_token_price_usd, gas);

        let profile = self.update_trader_profile(trader, usd_value, trade.timestamp).await;
        if profile.cumulative_volume_usd >= WHALE_CUMULATIVE_VOLUME_USD as f64 {
            events.push(SemanticEvent::AlertRaised(Alert::new_for_tx(
                AlertType::WhaleActivity,
                AlertSeverity::High,
                trade.token_in,
                trade.tx_hash,
                format!("trader {trader:#x} crossed ${:.2} cumulative volume", profile.cumulative_volume_usd),
                serde_json::json!({ "cumulative_usd": profile.cumulative_volume_usd }),
                trade.timestamp,
            )));
        }

        let unique = format!("{:#x}:{}", trade.tx_hash, trade.log_index);
        let other_token = if trade.token_out == self.base_token { trade.token_in } else { trade.token_out };
        let (_, pair_daily) = self
            .record_volume_window(&channels::volume_pair_key(&types::addr_key(trade.pair)), trade.timestamp, usd_value, &unique)
            .await;
        let _ = self
            .record_volume_window(&channels::volume_token_key(&types::addr_key(other_token)), trade.timestamp, usd_value, &unique)
            .await;

        let price_usd = pair_price_usd(pair, self.base_token, base_token_price_usd);
        let change_24h = self.record_price_point(trade.pair, trade.timestamp, price_usd).await;
        events.push(SemanticEvent::PriceUpdate {
            pair: trade.pair,
            price_usd,
            change_24h,
            volume_24h: Decimal::try_from(pair_daily).unwrap_or(Decimal::ZERO),
        });

        (trade, events)
    }

    /// Load-modify-store the trader's rolling profile in a single KV round
    /// trip (spec.md §4.9).
    async fn update_trader_profile(&self, trader: Address, usd_value: f64, timestamp: i64) -> TraderProfile {
        let key = channels::trader_profile_key(&types::addr_key(trader));
        let mut profile = self.kv.get_json::<TraderProfile>(&key).await.ok().flatten().unwrap_or_else(|| TraderProfile::new(timestamp));
        profile.record(usd_value, timestamp);
        let _ = self.kv.set_json(&key, &profile, None).await;
        profile
    }

    /// Add `usd_value` to `scope_key`'s rolling sorted set, prune entries
    /// older than the daily window, and return `(hourly_sum, daily_sum)`
    /// (spec.md §4.9: "rolling hourly and daily volumes per pair and per
    /// non-base token"). One daily-pruned set serves both windows: the
    /// hourly sum is just the subset scored within the last hour.
    async fn record_volume_window(&self, scope_key: &str, timestamp: i64, usd_value: f64, unique: &str) -> (f64, f64) {
        let member = format!("{timestamp}:{usd_value}:{unique}");
        let _ = self.kv.zadd(scope_key, &member, timestamp as f64).await;

        let daily_cutoff = (timestamp - DAILY_WINDOW_SECS) as f64;
        let _ = self.kv.zremrangebyscore(scope_key, f64::NEG_INFINITY, daily_cutoff).await;

        let entries = self.kv.zrangebyscore(scope_key, f64::NEG_INFINITY, f64::INFINITY).await.unwrap_or_default();
        let hourly_cutoff = timestamp - HOURLY_WINDOW_SECS;

        let mut hourly = 0.0;
        let mut daily = 0.0;
        for entry in entries {
            let Some((entry_ts, value)) = parse_volume_member(&entry) else { continue };
            daily += value;
            if entry_ts >= hourly_cutoff {
                hourly += value;
            }
        }
        (hourly, daily)
    }

    /// Append the current price to the pair's rolling price-history set,
    /// prune anything older than 24h, and return the percent change versus
    /// the oldest point still in the window — an approximation of "24h
    /// ago" bounded by whatever history the window actually holds.
    async fn record_price_point(&self, pair: Address, timestamp: i64, price_usd: Decimal) -> f64 {
        let key = channels::price_history_key(&types::addr_key(pair));
        let price_f64 = price_usd.to_f64().unwrap_or(0.0);
        let member = format!("{timestamp}:{price_f64}");
        let _ = self.kv.zadd(&key, &member, timestamp as f64).await;

        let cutoff = (timestamp - DAILY_WINDOW_SECS) as f64;
        let _ = self.kv.zremrangebyscore(&key, f64::NEG_INFINITY, cutoff).await;

        let oldest = self.kv.zrange(&key, 0, 0).await.unwrap_or_default();
        let Some(entry) = oldest.first() else { return 0.0 };
        let Some((_, old_price)) = parse_price_member(entry) else { return 0.0 };
        if old_price == 0.0 {
            0.0
        } else {
            (price_f64 - old_price) / old_price * 100.0
        }
    }

    pub async fn publish_trade_recent(&self, pair: Address, trade: &Trade) {
        if let Ok(json) = serde_json::to_string(trade) {
            let key = channels::trades_recent(&types::addr_key(pair));
            let _ = self
                .kv
                .list_push_trim(&key, &json, 100, Some(std::time::Duration::from_secs(3600)))
                .await;
        }
    }
}

/// Parse a `"<timestamp>:<usd_value>:<tx_hash>:<log_index>"` volume-window
/// member back into `(timestamp, usd_value)`.
fn parse_volume_member(member: &str) -> Option<(i64, f64)> {
    let mut parts = member.splitn(3, ':');
    let ts: i64 = parts.next()?.parse().ok()?;
    let value: f64 = parts.next()?.parse().ok()?;
    Some((ts, value))
}

/// Parse a `"<timestamp>:<price_usd>"` price-history member back into
/// `(timestamp, price_usd)`.
fn parse_price_member(member: &str) -> Option<(i64, f64)> {
    let mut parts = member.splitn(2, ':');
    let ts: i64 = parts.next()?.parse().ok()?;
    let price: f64 = parts.next()?.parse().ok()?;
    Some((ts, price))
}

/// Pair-ratio USD price of the pair's non-base side, in terms of the base
/// token's USD price (same constant-product ratio the price-impact and gas
/// modules already treat as 18-decimal wei-scale, spec.md §4.9
/// `websocket:price_update`). Zero if the pair doesn't actually include the
/// base token or has no reserves yet.
fn pair_price_usd(pair: &Pair, base_token: Address, base_token_price_usd: Decimal) -> Decimal {
    let (base_reserve, other_reserve) = if pair.token0 == base_token {
        (pair.reserve0, pair.reserve1)
    } else if pair.token1 == base_token {
        (pair.reserve1, pair.reserve0)
    } else {
        return Decimal::ZERO;
    };

    if other_reserve.is_zero() {
        return Decimal::ZERO;
    }

    let base_dec = Decimal::from_str(&base_reserve.to_string()).unwrap_or(Decimal::ZERO);
    let other_dec = Decimal::from_str(&other_reserve.to_string()).unwrap_or(Decimal::ZERO);
    if other_dec.is_zero() {
        return Decimal::ZERO;
    }
    (base_dec / other_dec) * base_token_price_usd
}

/// Build the `Trade` row and classify it into zero or more alerts (spec.md
/// §4.9). `trader` is the swap's `to` address — the party receiving the
/// output. Pure (no KV/Store I/O), so `TradeProcessor::process` layers the
/// async cumulative-volume check on top rather than doing any I/O itself.
fn classify_trade(
    base_token: Address,
    swap: &SwapEvent,
    meta: LogMeta,
    pair: &Pair,
    trader: Address,
    base_token_price_usd: Decimal,
    gas: GasInfo,
) -> (Trade, f64, Vec<SemanticEvent>) {
    let (token_in, token_out, amount_in, amount_out, reserve_in, reserve_out) =
        if swap.token_in_is_token0() {
            (pair.token0, pair.token1, swap.amount0_in, swap.amount1_out, pair.reserve0, pair.reserve1)
        } else {
            (pair.token1, pair.token0, swap.amount1_in, swap.amount0_out, pair.reserve1, pair.reserve0)
        };

    let impact = price_impact_pct(reserve_in, reserve_out, amount_in, amount_out);

    let trade = Trade {
        tx_hash: meta.tx_hash,
        log_index: meta.log_index,
        block_number: meta.block_number,
        timestamp: meta.timestamp,
        pair: swap.pair,
        trader,
        token_in,
        token_out,
        amount_in,
        amount_out,
        price_impact: impact,
        gas_used: gas.gas_used,
        gas_price_wei: gas.gas_price_wei,
    };

    let usd_value = base_side_usd_value(base_token, token_in, amount_in, token_out, amount_out, base_token_price_usd);
    let mut events = Vec::new();

    if usd_value >= WHALE_USD || impact > WHALE_PRICE_IMPACT_PCT {
        let severity = if usd_value >= WHALE_USD { AlertSeverity::High } else { AlertSeverity::Medium };
        events.push(SemanticEvent::AlertRaised(Alert::new_for_tx(
            AlertType::WhaleActivity,
            severity,
            token_in,
            trade.tx_hash,
            format!("trade worth ${usd_value:.2} (impact {impact:.2}%)"),
            serde_json::json!({ "usd_value": usd_value, "price_impact": impact }),
            meta.timestamp,
        )));
    } else if usd_value >= LARGE_USD {
        let (alert_type, label) = if token_out == base_token {
            (AlertType::LargeSell, "sell")
        } else {
            (AlertType::LargeBuy, "buy")
        };
        events.push(SemanticEvent::AlertRaised(Alert::new_for_tx(
            alert_type,
            AlertSeverity::Medium,
            token_in,
            trade.tx_hash,
            format!("large {label} worth ${usd_value:.2}"),
            serde_json::json!({ "usd_value": usd_value }),
            meta.timestamp,
        )));
    }

    events.push(SemanticEvent::NewTrade(trade.clone()));
    (trade, usd_value, events)
}

fn base_side_usd_value(
    base_token: Address,
    token_in: Address,
    amount_in: U256,
    token_out: Address,
    amount_out: U256,
    base_price_usd: Decimal,
) -> f64 {
    let base_amount = if token_in == base_token {
        amount_in
    } else if token_out == base_token {
        amount_out
    } else {
        return 0.0;
    };
    let scaled = Decimal::from_str(&base_amount.to_string()).unwrap_or(Decimal::ZERO)
        / Decimal::from(10u64.pow(BASE_TOKEN_DECIMALS));
    (scaled * base_price_usd).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::H256;
    use rust_decimal_macros::dec;

    fn meta() -> LogMeta {
        LogMeta { block_number: 100, tx_hash: H256::repeat_byte(7), log_index: 2, timestamp: 1_700_000_000 }
    }

    fn pair_with_reserves(token0: Address, token1: Address, reserve0: U256, reserve1: U256) -> Pair {
        Pair {
            address: Address::repeat_byte(0xAA),
            token0,
            token1,
            reserve0,
            reserve1,
            dex_name: "test-dex".into(),
            created_at: 0,
            block_number: 1,
        }
    }

    fn pair(token0: Address, token1: Address) -> Pair {
        pair_with_reserves(
            token0,
            token1,
            U256::from(1_000_000u64) * U256::exp10(18),
            U256::from(2_000_000u64) * U256::exp10(18),
        )
    }

    /// spec.md §8 scenario 3: swap on pair 0xPAIR, amount1In = 10,
    /// amount0Out = 2000, token0 is the base token, trade value in USD
    /// between 100 and 500 — expect LARGE_SELL at MEDIUM severity. Reserves
    /// are sized so the fill is close to the pool ratio (small, nonzero
    /// price impact) rather than crossing the whale-impact threshold.
    #[test]
    fn sell_between_100_and_500_usd_is_large_sell() {
        let base_token = Address::repeat_byte(0xB0);
        let other_token = Address::repeat_byte(0xC0);
        let p = pair_with_reserves(
            base_token,
            other_token,
            U256::from(1_000_000u64) * U256::exp10(18),
            U256::from(50_000_000u64) * U256::exp10(18),
        );

        let swap = SwapEvent {
            pair: p.address,
            sender: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            amount0_in: U256::zero(),
            amount1_in: U256::from(10u64) * U256::exp10(18),
            amount0_out: U256::from(199u64) * U256::exp10(15), // 0.199 base tokens out
            amount1_out: U256::zero(),
        };

        let (trade, usd_value, events) = classify_trade(
            base_token,
            &swap,
            meta(),
            &p,
            swap.to,
            dec!(1000), // $1000/base token -> 0.199 * 1000 = $199
            GasInfo { gas_used: Some(21_000), gas_price_wei: None },
        );

        assert!((100.0..500.0).contains(&usd_value), "usd_value = {usd_value}");
        assert_eq!(trade.token_out, base_token);
        assert!(trade.price_impact > 0.0 && trade.price_impact < WHALE_PRICE_IMPACT_PCT);

        let alert = events.iter().find_map(|e| match e {
            SemanticEvent::AlertRaised(a) => Some(a),
            _ => None,
        });
        let alert = alert.expect("expected a LARGE_SELL alert");
        assert_eq!(alert.alert_type, AlertType::LargeSell);
        assert_eq!(alert.severity, AlertSeverity::Medium);
    }

    #[test]
    fn whale_usd_value_outranks_large_sell() {
        let base_token = Address::repeat_byte(0xB0);
        let other_token = Address::repeat_byte(0xC0);
        let p = pair(base_token, other_token);

        let swap = SwapEvent {
            pair: p.address,
            sender: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            amount0_in: U256::zero(),
            amount1_in: U256::from(10u64) * U256::exp10(18),
            amount0_out: U256::from(1u64) * U256::exp10(18), // 1 base token out
            amount1_out: U256::zero(),
        };

        let (_trade, usd_value, events) = classify_trade(
            base_token,
            &swap,
            meta(),
            &p,
            swap.to,
            dec!(1000), // $1000
            GasInfo { gas_used: None, gas_price_wei: None },
        );

        assert!(usd_value >= WHALE_USD);
        let alert = events.iter().find_map(|e| match e {
            SemanticEvent::AlertRaised(a) => Some(a),
            _ => None,
        });
        assert_eq!(alert.unwrap().alert_type, AlertType::WhaleActivity);
    }

    #[test]
    fn non_base_swap_has_no_usd_value() {
        let token_a = Address::repeat_byte(0xD0);
        let token_b = Address::repeat_byte(0xD1);
        let p = pair(token_a, token_b);

        let swap = SwapEvent {
            pair: p.address,
            sender: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            amount0_in: U256::from(10u64) * U256::exp10(18),
            amount1_in: U256::zero(),
            amount0_out: U256::zero(),
            amount1_out: U256::from(5u64) * U256::exp10(18),
        };

        let (_trade, usd_value, events) = classify_trade(
            Address::repeat_byte(0xB0),
            &swap,
            meta(),
            &p,
            swap.to,
            dec!(1000),
            GasInfo { gas_used: None, gas_price_wei: None },
        );

        assert_eq!(usd_value, 0.0);
        assert!(!events.iter().any(|e| matches!(e, SemanticEvent::AlertRaised(_))));
    }
}
