//! `LiquidityProcessor` (spec.md §4.10): reserve tracking, significant
//! add/remove detection, reserve-shift watchdog.

use amm::reserve_removal_pct;
use ethers_core::types::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use types::{
    Alert, AlertSeverity, AlertType, BurnEvent, LiquidityEvent, LiquidityEventKind, LogMeta,
    MintEvent, Pair, SemanticEvent, SyncEvent,
};

const LIQUIDITY_ADD_USD_THRESHOLD: f64 = 50_000.0;
const LIQUIDITY_REMOVE_USD_THRESHOLD: f64 = 50_000.0;
const CRITICAL_REMOVAL_PCT: f64 = 80.0;
/// Reserve-shift watchdog threshold (spec.md §4.10, §9 ambiguity (c)):
/// logs a warning only, no alert, at this version of the spec.
pub const SIGNIFICANT_RESERVE_SHIFT_PCT: f64 = 50.0;

pub struct LiquidityProcessor;

fn decimal_of(v: U256) -> Decimal {
    Decimal::from_str(&v.to_string()).unwrap_or(Decimal::ZERO)
}

impl LiquidityProcessor {
    /// On a new pair that includes the base token (spec.md §4.10 "On new
    /// pair"): builds the `NewPair` semantic event / alert.
    pub fn on_new_pair(pair: &Pair, base_token: ethers_core::types::Address, timestamp: i64) -> Vec<SemanticEvent> {
        let mut events = vec![SemanticEvent::NewPair(pair.clone())];
        if pair.includes(base_token) {
            events.push(SemanticEvent::AlertRaised(Alert::new(
                AlertType::NewPair,
                AlertSeverity::Medium,
                pair.address,
                format!("new pair {} ({}/{})", pair.address, pair.token0, pair.token1),
                serde_json::json!({ "pair": types::addr_key(pair.address) }),
                timestamp,
            )));
        }
        events
    }

    /// Mint -> LiquidityEvent(ADD); LIQUIDITY_ADDED (HIGH) if the
    /// estimated USD value crosses the threshold.
    pub fn on_mint(
        mint: &MintEvent,
        meta: LogMeta,
        token0_price_usd: Decimal,
        token1_price_usd: Decimal,
        liquidity_minted: U256,
    ) -> (LiquidityEvent, Vec<SemanticEvent>) {
        let event = LiquidityEvent {
            tx_hash: meta.tx_hash,
            log_index: meta.log_index,
            block_number: meta.block_number,
            timestamp: meta.timestamp,
            pair: mint.pair,
            provider: mint.sender,
            token0_amount: mint.amount0,
            token1_amount: mint.amount1,
            liquidity: liquidity_minted,
            kind: LiquidityEventKind::Add,
        };

        let usd_value = (decimal_of(mint.amount0) * token0_price_usd + decimal_of(mint.amount1) * token1_price_usd)
            .to_f64()
            .unwrap_or(0.0);

        let mut alerts = Vec::new();
        if usd_value >= LIQUIDITY_ADD_USD_THRESHOLD {
            alerts.push(SemanticEvent::AlertRaised(Alert::new_for_tx(
                AlertType::LiquidityAdded,
                AlertSeverity::High,
                mint.pair,
                meta.tx_hash,
                format!("${usd_value:.2} liquidity added to {}", mint.pair),
                serde_json::json!({ "usd_value": usd_value }),
                meta.timestamp,
            )));
        }
        alerts.push(SemanticEvent::LiquidityAdded(event.clone()));
        (event, alerts)
    }

    /// Burn -> LiquidityEvent(REMOVE); CRITICAL if >=80% of either
    /// reserve is removed, else HIGH if USD value crosses the threshold
    /// (spec.md §4.10, §8 scenario 4).
    pub fn on_burn(
        burn: &BurnEvent,
        meta: LogMeta,
        reserves_before: (U256, U256),
        token0_price_usd: Decimal,
        token1_price_usd: Decimal,
        liquidity_burned: U256,
    ) -> (LiquidityEvent, Vec<SemanticEvent>) {
        let event = LiquidityEvent {
            tx_hash: meta.tx_hash,
            log_index: meta.log_index,
            block_number: meta.block_number,
            timestamp: meta.timestamp,
            pair: burn.pair,
            provider: burn.sender,
            token0_amount: burn.amount0,
            token1_amount: burn.amount1,
            liquidity: liquidity_burned,
            kind: LiquidityEventKind::Remove,
        };

        let pct = reserve_removal_pct(reserves_before.0, reserves_before.1, burn.amount0, burn.amount1);
        let usd_value = (decimal_of(burn.amount0) * token0_price_usd + decimal_of(burn.amount1) * token1_price_usd)
            .to_f64()
            .unwrap_or(0.0);

        let mut events = Vec::new();
        if pct >= CRITICAL_REMOVAL_PCT {
            events.push(SemanticEvent::AlertRaised(Alert::new_for_tx(
                AlertType::CriticalLiquidityRemoval,
                AlertSeverity::Critical,
                burn.pair,
                meta.tx_hash,
                format!("{pct:.1}% of liquidity pulled from {}", burn.pair),
                serde_json::json!({ "percentage_removed": pct }),
                meta.timestamp,
            )));
        } else if usd_value >= LIQUIDITY_REMOVE_USD_THRESHOLD {
            events.push(SemanticEvent::AlertRaised(Alert::new_for_tx(
                AlertType::LiquidityRemoved,
                AlertSeverity::High,
                burn.pair,
                meta.tx_hash,
                format!("${usd_value:.2} liquidity removed from {}", burn.pair),
                serde_json::json!({ "usd_value": usd_value }),
                meta.timestamp,
            )));
        }
        events.push(SemanticEvent::LiquidityRemoved(event.clone()));
        (event, events)
    }

    /// Sync -> reserve update. Returns `Some(shift_pct)` if either side
    /// moved by more than `SIGNIFICANT_RESERVE_SHIFT_PCT` versus the
    /// prior snapshot, for the caller to log as a warning (spec.md §4.10,
    /// §9 ambiguity (c): no alert is raised for this, by design).
    pub fn on_sync(sync: &SyncEvent, previous: Option<(U256, U256)>) -> Option<f64> {
        let (prev0, prev1) = previous?;
        let shift0 = reserve_shift_pct(prev0, sync.reserve0);
        let shift1 = reserve_shift_pct(prev1, sync.reserve1);
        let max_shift = shift0.max(shift1);
        (max_shift > SIGNIFICANT_RESERVE_SHIFT_PCT).then_some(max_shift)
    }
}

fn reserve_shift_pct(before: U256, after: U256) -> f64 {
    if before.is_zero() {
        return 0.0;
    }
    let diff = if after > before { after - before } else { before - after };
    let bps = diff.saturating_mul(U256::from(10_000u64)) / before;
    bps.min(U256::from(u32::MAX)).as_u32() as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::{Address, H256};

    fn meta() -> LogMeta {
        LogMeta { block_number: 1, tx_hash: H256::repeat_byte(1), log_index: 0, timestamp: 0 }
    }

    #[test]
    fn burn_removing_80_percent_of_both_sides_is_critical() {
        let burn = BurnEvent {
            pair: Address::zero(),
            sender: Address::zero(),
            to: Address::zero(),
            amount0: U256::from(800u64),
            amount1: U256::from(1_600_000_000u64),
        };
        let (_event, alerts) = LiquidityProcessor::on_burn(
            &burn,
            meta(),
            (U256::from(1000u64), U256::from(2_000_000_000u64)),
            Decimal::ZERO,
            Decimal::ZERO,
            U256::zero(),
        );
        let has_critical = alerts.iter().any(|e| matches!(
            e,
            SemanticEvent::AlertRaised(a) if a.alert_type == AlertType::CriticalLiquidityRemoval
        ));
        assert!(has_critical);
    }

    #[test]
    fn mint_with_zero_amounts_produces_no_alert() {
        let mint = MintEvent { pair: Address::zero(), sender: Address::zero(), amount0: U256::zero(), amount1: U256::zero() };
        let (event, alerts) = LiquidityProcessor::on_mint(&mint, meta(), Decimal::ZERO, Decimal::ZERO, U256::zero());
        assert_eq!(event.liquidity, U256::zero());
        assert!(!alerts.iter().any(|e| matches!(e, SemanticEvent::AlertRaised(_))));
    }

    #[test]
    fn sync_below_threshold_is_not_significant() {
        let sync = SyncEvent { pair: Address::zero(), reserve0: U256::from(1050u64), reserve1: U256::from(2000u64) };
        assert!(LiquidityProcessor::on_sync(&sync, Some((U256::from(1000u64), U256::from(2000u64)))).is_none());
    }

    #[test]
    fn sync_above_threshold_is_significant() {
        let sync = SyncEvent { pair: Address::zero(), reserve0: U256::from(1600u64), reserve1: U256::from(2000u64) };
        assert!(LiquidityProcessor::on_sync(&sync, Some((U256::from(1000u64), U256::from(2000u64)))).is_some());
    }
}
