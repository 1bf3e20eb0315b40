//! Named channels, sorted sets, hashes and lists from spec.md §6, kept in
//! one place so producers and (future) consumers never drift on a string.

pub const TOKEN_EVENTS: &str = "token-events";
pub const TRADE_EVENTS: &str = "trade-events";
pub const PAIR_EVENTS: &str = "pair-events";
pub const LIQUIDITY_EVENTS: &str = "liquidity-events";
pub const TOKEN_UPDATE: &str = "token:update";

pub const WEBSOCKET_NEW_TOKEN: &str = "websocket:new_token";
pub const WEBSOCKET_TRADE: &str = "websocket:trade";
pub const WEBSOCKET_PRICE_UPDATE: &str = "websocket:price_update";
pub const WEBSOCKET_ALERTS: &str = "websocket:alerts";

pub const TELEGRAM_ALERTS_LIST: &str = "telegram:alerts";
pub const WEBHOOKS_QUEUE_LIST: &str = "webhooks:queue";

pub const TOKENS_BY_CREATION: &str = "tokens:by_creation";
pub const TOKENS_BY_RUG_SCORE: &str = "tokens:by_rug_score";
pub const TOKENS_BY_LIQUIDITY: &str = "tokens:by_liquidity";

pub const STATUS_SNAPSHOT: &str = "status:snapshot";
/// Rendered Prometheus text exposition of `monitor::metrics`, refreshed on
/// the same once-a-minute cadence as `STATUS_SNAPSHOT` (SPEC_FULL.md §7).
pub const METRICS_TEXT: &str = "status:metrics";

pub fn pairs_by_dex(dex: &str) -> String {
    format!("pairs:{dex}")
}

pub fn token_pairs(token: &str) -> String {
    format!("token:pairs:{token}")
}

pub fn trades_recent(pair: &str) -> String {
    format!("trades:recent:{pair}")
}

pub fn trades_token(token: &str) -> String {
    format!("trades:token:{token}")
}

pub fn token_cache_key(token: &str) -> String {
    format!("token:{token}")
}

pub fn holders_cache_key(token: &str) -> String {
    format!("holders:{token}")
}

/// Rolling trade-volume sorted set for a pair, pruned to the daily window
/// (spec.md §4.9: "rolling hourly and daily volumes per pair").
pub fn volume_pair_key(pair: &str) -> String {
    format!("volume:pair:{pair}")
}

/// Rolling trade-volume sorted set for a non-base token (spec.md §4.9:
/// "...and per non-base token").
pub fn volume_token_key(token: &str) -> String {
    format!("volume:token:{token}")
}

/// Rolling price-history sorted set for a pair, pruned to the daily
/// window, used to derive `price_change_24h` (spec.md §4.9 `websocket:
/// price_update`).
pub fn price_history_key(pair: &str) -> String {
    format!("price:history:{pair}")
}

/// Trader profile JSON blob (spec.md §4.9: "counters, avg size,
/// first/last seen").
pub fn trader_profile_key(trader: &str) -> String {
    format!("trader:profile:{trader}")
}

/// Webhook queue entry (spec.md §4.12: `{url, payload, retries}`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WebhookQueueEntry {
    pub url: String,
    pub payload: serde_json::Value,
    pub retries: u32,
}
