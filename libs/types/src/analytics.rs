//! Derived per-token analytics (spec.md §3 "TokenAnalytics", §4.11).

use crate::address::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of `AnalyticsEngine`'s output for a single token. Recomputed
/// wholesale on each run, never incrementally patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAnalytics {
    pub token_address: Address,
    /// 0-100, see `AnalyticsEngine::rug_score`.
    pub rug_score: u8,
    pub is_honeypot: bool,
    /// Percent, 0-100.
    pub ownership_concentration: f64,
    pub liquidity_usd: Decimal,
    pub volume_24h: Decimal,
    pub holders: i64,
    pub transactions_24h: i64,
    pub price_usd: Decimal,
    /// Percent change versus 24h ago; positive or negative.
    pub price_change_24h: f64,
    pub market_cap_usd: Decimal,
    pub circulating_supply: Decimal,
    /// Percent of supply, 0-100.
    pub max_wallet_pct: Option<f64>,
    /// Percent of supply, 0-100.
    pub max_tx_pct: Option<f64>,
    /// Percent, 0-100.
    pub buy_tax: f64,
    /// Percent, 0-100.
    pub sell_tax: f64,
    pub is_renounced: bool,
    pub liquidity_locked: bool,
    /// Unix seconds, if `liquidity_locked`.
    pub liquidity_lock_expiry: Option<i64>,
}

impl TokenAnalytics {
    /// Whale activity threshold used by `TradeProcessor` (spec.md §4.9,
    /// glossary "Whale").
    pub const WHALE_VOLUME_USD: i64 = 100_000;
}
