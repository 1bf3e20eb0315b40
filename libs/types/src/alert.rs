//! Alert entity and classification (spec.md §3 "Alert", §4.12).

use crate::address::{addr_key, Address};
use ethers_core::types::H256;
use serde::{Deserialize, Serialize};

/// Alert severity, used by `AlertRouter` to pick fan-out destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Every semantic alert kind emitted by the processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    NewToken,
    TokenLaunched,
    OwnershipRenounced,
    HoneypotDetected,
    RugWarning,
    WhaleActivity,
    LargeBuy,
    LargeSell,
    NewPair,
    LiquidityAdded,
    LiquidityRemoved,
    CriticalLiquidityRemoval,
}

impl AlertType {
    /// Kebab-case slug used to build deterministic alert ids.
    fn slug(self) -> &'static str {
        match self {
            AlertType::NewToken => "new-token",
            AlertType::TokenLaunched => "token-launched",
            AlertType::OwnershipRenounced => "ownership-renounced",
            AlertType::HoneypotDetected => "honeypot-detected",
            AlertType::RugWarning => "rug-warning",
            AlertType::WhaleActivity => "whale-activity",
            AlertType::LargeBuy => "large-buy",
            AlertType::LargeSell => "large-sell",
            AlertType::NewPair => "new-pair",
            AlertType::LiquidityAdded => "liquidity-added",
            AlertType::LiquidityRemoved => "liquidity-removed",
            AlertType::CriticalLiquidityRemoval => "critical-liquidity-removal",
        }
    }
}

/// A routed, deduplicated alert (spec.md invariant 6: `Alert.id` is
/// deterministic from the triggering event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub token_address: Address,
    pub message: String,
    pub data: serde_json::Value,
    /// Unix seconds.
    pub timestamp: i64,
    pub sent: bool,
}

impl Alert {
    /// Build an alert with the deterministic id scheme: `<slug>-<token>`,
    /// or `<slug>-<tx_hash>` for per-transaction events where the token
    /// address alone would not disambiguate repeated triggers.
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        token_address: Address,
        message: impl Into<String>,
        data: serde_json::Value,
        timestamp: i64,
    ) -> Self {
        let id = format!("{}-{}", alert_type.slug(), addr_key(token_address));
        Self {
            id,
            alert_type,
            severity,
            token_address,
            message: message.into(),
            data,
            timestamp,
            sent: false,
        }
    }

    /// Build an alert whose id is scoped to a specific transaction rather
    /// than just the token, for events that can legitimately fire more
    /// than once per token (e.g. repeated large liquidity removals).
    pub fn new_for_tx(
        alert_type: AlertType,
        severity: AlertSeverity,
        token_address: Address,
        tx_hash: H256,
        message: impl Into<String>,
        data: serde_json::Value,
        timestamp: i64,
    ) -> Self {
        let id = format!("{}-{:#x}", alert_type.slug(), tx_hash);
        Self {
            id,
            alert_type,
            severity,
            token_address,
            message: message.into(),
            data,
            timestamp,
            sent: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_alert_id_matches_spec_example() {
        let token: Address = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
            .parse()
            .unwrap();
        let alert = Alert::new(
            AlertType::NewToken,
            AlertSeverity::Low,
            token,
            "new token",
            serde_json::json!({}),
            1_700_000_000,
        );
        assert_eq!(alert.id, "new-token-0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn critical_liquidity_removal_id_is_per_tx() {
        let token: Address = Address::zero();
        let tx: H256 = H256::repeat_byte(0x11);
        let alert = Alert::new_for_tx(
            AlertType::CriticalLiquidityRemoval,
            AlertSeverity::Critical,
            token,
            tx,
            "pulled",
            serde_json::json!({}),
            0,
        );
        assert!(alert.id.starts_with("critical-liquidity-removal-0x1111"));
    }
}
