//! The semantic event firehose (spec.md §6), expressed as explicit typed
//! channels (spec.md §9) instead of an in-process emitter.
//!
//! Each variant knows which KV channel it belongs on and how to render
//! itself as the JSON envelope that channel's external consumers expect.

use crate::{Alert, LiquidityEvent, Pair, Token, Trade};
use serde::{Deserialize, Serialize};

/// A semantic event ready to be published onto the KV bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SemanticEvent {
    NewToken(Token),
    TokenLaunched(Token),
    TradingEnabled(Token),
    OwnershipRenounced(Token),
    NewTrade(Trade),
    NewPair(Pair),
    LiquidityAdded(LiquidityEvent),
    LiquidityRemoved(LiquidityEvent),
    TokenUpdate {
        address: crate::Address,
        holders: i64,
        timestamp: i64,
    },
    PriceUpdate {
        pair: crate::Address,
        price_usd: rust_decimal::Decimal,
        change_24h: f64,
        volume_24h: rust_decimal::Decimal,
    },
    AlertRaised(Alert),
}

impl SemanticEvent {
    /// Every KV channel this event class may be published onto, in the
    /// order spec.md §6 lists them. A publisher fans out to all of them.
    pub fn channels(&self) -> &'static [&'static str] {
        match self {
            SemanticEvent::NewToken(_) => &["token-events", "websocket:new_token"],
            SemanticEvent::TokenLaunched(_) => &["token-events"],
            SemanticEvent::TradingEnabled(_) => &["token-events"],
            SemanticEvent::OwnershipRenounced(_) => &["token-events"],
            SemanticEvent::NewTrade(_) => &["trade-events", "websocket:trade"],
            SemanticEvent::NewPair(_) => &["pair-events"],
            SemanticEvent::LiquidityAdded(_) => &["liquidity-events"],
            SemanticEvent::LiquidityRemoved(_) => &["liquidity-events"],
            SemanticEvent::TokenUpdate { .. } => &["token:update"],
            SemanticEvent::PriceUpdate { .. } => &["websocket:price_update"],
            SemanticEvent::AlertRaised(_) => &["websocket:alerts"],
        }
    }

    /// The `event` tag used in the `{event, data, timestamp}` envelope
    /// (spec.md §6). `None` for channels whose payload is the raw entity.
    fn event_tag(&self) -> Option<&'static str> {
        match self {
            SemanticEvent::NewToken(_) => Some("NEW_TOKEN"),
            SemanticEvent::TokenLaunched(_) => Some("TOKEN_LAUNCHED"),
            SemanticEvent::TradingEnabled(_) => Some("TRADING_ENABLED"),
            SemanticEvent::OwnershipRenounced(_) => Some("OWNERSHIP_RENOUNCED"),
            SemanticEvent::NewTrade(_) => Some("NEW_TRADE"),
            _ => None,
        }
    }

    /// Render the JSON payload to publish on `channel` (a member of
    /// `self.channels()`).
    pub fn payload(&self, timestamp: i64) -> serde_json::Value {
        let data = match self {
            SemanticEvent::NewToken(t)
            | SemanticEvent::TokenLaunched(t)
            | SemanticEvent::TradingEnabled(t)
            | SemanticEvent::OwnershipRenounced(t) => serde_json::to_value(t),
            SemanticEvent::NewTrade(t) => serde_json::to_value(t),
            SemanticEvent::NewPair(p) => serde_json::to_value(p),
            SemanticEvent::LiquidityAdded(l) | SemanticEvent::LiquidityRemoved(l) => {
                serde_json::to_value(l)
            }
            SemanticEvent::TokenUpdate {
                address,
                holders,
                timestamp,
            } => serde_json::to_value(serde_json::json!({
                "address": crate::addr_key(*address),
                "holders": holders,
                "timestamp": timestamp,
            })),
            SemanticEvent::PriceUpdate {
                pair,
                price_usd,
                change_24h,
                volume_24h,
            } => serde_json::to_value(serde_json::json!({
                "pair": crate::addr_key(*pair),
                "price_usd": price_usd,
                "change_24h": change_24h,
                "volume_24h": volume_24h,
            })),
            SemanticEvent::AlertRaised(a) => serde_json::to_value(a),
        }
        .unwrap_or(serde_json::Value::Null);

        match self.event_tag() {
            Some(event) => serde_json::json!({ "event": event, "data": data, "timestamp": timestamp }),
            None => data,
        }
    }
}
