//! `TokenProcessor` (spec.md §4.8): token registration, contract-read
//! enrichment, analytics composition, lifecycle alerts.

use crate::analytics::{AnalyticsEngine, AnalyticsInputs};
use crate::contract_reads::ContractReader;
use crate::price_provider::PriceProvider;
use chain_client::ChainClient;
use ethers_core::types::{Address, H256, U256};
use kv::{channels, KvClient};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use types::{
    Alert, AlertSeverity, AlertType, SemanticEvent, Token, TokenAnalytics, TokenCreatedEvent,
    TokenLaunchedEvent, TokenStatus, TradingControls,
};

const RUG_SCORE_HIGH: u8 = 80;
const HIGH_TAX_PCT: f64 = 10.0;
const OWNERSHIP_CONCENTRATION_ALERT_PCT: f64 = 50.0;

pub struct TokenProcessor {
    chain: Arc<ChainClient>,
    kv: KvClient,
}

impl TokenProcessor {
    pub fn new(chain: Arc<ChainClient>, kv: KvClient) -> Self {
        Self { chain, kv }
    }

    /// On `TokenCreated` (spec.md §4.8 "On token created"): registers the
    /// token with its bonding-curve defaults, no enrichment yet (the
    /// contract may not have trading controls configured until launch).
    pub fn on_created(
        &self,
        event: &TokenCreatedEvent,
        tx_hash: H256,
        block_number: u64,
        timestamp: i64,
    ) -> (Token, Vec<SemanticEvent>) {
        let token = Token {
            address: event.token,
            name: event.name.clone(),
            symbol: event.symbol.clone(),
            decimals: Token::DEFAULT_DECIMALS,
            total_supply: Token::default_total_supply(),
            creator: event.creator,
            created_at: timestamp,
            block_number,
            tx_hash,
            status: TokenStatus::Created,
            ownership_renounced: false,
            metadata: None,
            trading_controls: TradingControls::default(),
            holders_count: 0,
        };

        let alert = Alert::new(
            AlertType::NewToken,
            AlertSeverity::Low,
            token.address,
            format!("new token {} ({})", token.name, token.symbol),
            serde_json::json!({ "creator": types::addr_key(token.creator) }),
            timestamp,
        );

        (token.clone(), vec![SemanticEvent::NewToken(token), SemanticEvent::AlertRaised(alert)])
    }

    /// On `TokenLaunched` (spec.md §4.8 "On token launched"): flips status
    /// to `Launched` and runs the full enrichment + analytics pass.
    pub async fn on_launched(
        &self,
        mut token: Token,
        event: &TokenLaunchedEvent,
        timestamp: i64,
        price_provider: &dyn PriceProvider,
    ) -> (Token, TokenAnalytics, Vec<SemanticEvent>) {
        token.status = TokenStatus::Launched;

        let (analytics, mut events) = self.enrich_and_analyze(&token, timestamp, price_provider).await;

        events.push(SemanticEvent::TokenLaunched(token.clone()));
        events.push(SemanticEvent::AlertRaised(Alert::new(
            AlertType::TokenLaunched,
            AlertSeverity::Low,
            token.address,
            format!("{} launched with {} liquidity", token.symbol, event.liquidity_added),
            serde_json::json!({ "liquidity_added": event.liquidity_added.to_string() }),
            timestamp,
        )));

        (token, analytics, events)
    }

    /// On ownership renounced (spec.md §4.8 "On ownership renounced"):
    /// marks the token and discounts its rug score.
    pub fn on_renounce(&self, mut token: Token, previous_rug_score: u8, timestamp: i64) -> (Token, u8, Vec<SemanticEvent>) {
        token.ownership_renounced = true;
        let new_score = AnalyticsEngine::apply_renounce_discount(previous_rug_score);
        let alert = Alert::new(
            AlertType::OwnershipRenounced,
            AlertSeverity::Low,
            token.address,
            format!("{} ownership renounced", token.symbol),
            serde_json::json!({}),
            timestamp,
        );
        (token.clone(), new_score, vec![SemanticEvent::OwnershipRenounced(token), SemanticEvent::AlertRaised(alert)])
    }

    /// Runs the contract-read enrichment pass and composes `TokenAnalytics`,
    /// emitting `HONEYPOT_DETECTED` / `RUG_WARNING` / `WHALE_ACTIVITY`
    /// alerts as thresholds are crossed (spec.md §4.8, §4.11).
    async fn enrich_and_analyze(
        &self,
        token: &Token,
        timestamp: i64,
        price_provider: &dyn PriceProvider,
    ) -> (TokenAnalytics, Vec<SemanticEvent>) {
        let reader = ContractReader::new(&self.chain);

        let ownership_renounced = reader.ownership_renounced(token.address).await || token.ownership_renounced;
        let trading_enabled = reader.trading_enabled(token.address).await.unwrap_or(false);
        let max_wallet = reader.max_wallet_amount(token.address).await;
        let max_tx = reader.max_transaction_amount(token.address).await;
        let buy_tax = bps_to_pct(reader.buy_tax_bps(token.address).await);
        let sell_tax = bps_to_pct(reader.sell_tax_bps(token.address).await);
        let simulated_transfer_reverts = reader.simulated_transfer_reverts(token.address).await;

        let holders = token.holders_count;
        let ownership_concentration = self.top_holder_concentration(token.address, token.total_supply).await;

        let inputs = AnalyticsInputs {
            contract_verified: true,
            ownership_renounced,
            liquidity_locked: false,
            ownership_concentration_pct: ownership_concentration,
            buy_tax_pct: buy_tax,
            sell_tax_pct: sell_tax,
            simulated_transfer_reverts,
        };

        let rug_score = AnalyticsEngine::rug_score(&inputs);
        let is_honeypot = AnalyticsEngine::is_honeypot(&inputs);
        let price_usd = price_provider.base_token_price_usd().await;

        let total_supply_decimal = Decimal::from_str(&token.total_supply.to_string())
            .unwrap_or(Decimal::ZERO)
            / Decimal::from(10u64.pow(token.decimals as u32));
        let market_cap_usd = total_supply_decimal * price_usd;

        let analytics = TokenAnalytics {
            token_address: token.address,
            rug_score,
            is_honeypot,
            ownership_concentration,
            liquidity_usd: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            holders,
            transactions_24h: 0,
            price_usd,
            price_change_24h: 0.0,
            market_cap_usd,
            circulating_supply: total_supply_decimal,
            max_wallet_pct: max_wallet.map(|v| pct_of_supply(v, token.total_supply)),
            max_tx_pct: max_tx.map(|v| pct_of_supply(v, token.total_supply)),
            buy_tax,
            sell_tax,
            is_renounced: ownership_renounced,
            liquidity_locked: false,
            liquidity_lock_expiry: None,
        };

        let mut events = Vec::new();

        if is_honeypot {
            events.push(SemanticEvent::AlertRaised(Alert::new(
                AlertType::HoneypotDetected,
                AlertSeverity::Critical,
                token.address,
                format!("{} flagged as a likely honeypot", token.symbol),
                serde_json::json!({ "buy_tax": buy_tax, "sell_tax": sell_tax }),
                timestamp,
            )));
        } else if rug_score > RUG_SCORE_HIGH {
            events.push(SemanticEvent::AlertRaised(Alert::new(
                AlertType::RugWarning,
                AlertSeverity::High,
                token.address,
                format!("{} rug score {rug_score}"),
                serde_json::json!({ "rug_score": rug_score }),
                timestamp,
            )));
        } else if buy_tax > HIGH_TAX_PCT || sell_tax > HIGH_TAX_PCT {
            events.push(SemanticEvent::AlertRaised(Alert::new(
                AlertType::RugWarning,
                AlertSeverity::Medium,
                token.address,
                format!("{} has elevated transfer tax ({buy_tax:.1}%/{sell_tax:.1}%)", token.symbol),
                serde_json::json!({ "buy_tax": buy_tax, "sell_tax": sell_tax }),
                timestamp,
            )));
        }

        if ownership_concentration > OWNERSHIP_CONCENTRATION_ALERT_PCT {
            events.push(SemanticEvent::AlertRaised(Alert::new(
                AlertType::WhaleActivity,
                AlertSeverity::Medium,
                token.address,
                format!("top holder controls {ownership_concentration:.1}% of {}", token.symbol),
                serde_json::json!({ "ownership_concentration": ownership_concentration }),
                timestamp,
            )));
        }

        self.cache_analytics(token, &analytics).await;

        (analytics, events)
    }

    /// Percent of total supply held by the token's own creator, used as a
    /// stand-in for a full top-holder scan (spec.md §4.11 doesn't specify
    /// which holder(s) define "concentration"; the creator is the only
    /// address this pass can cheaply resolve without a holders table
    /// join, see DESIGN.md).
    async fn top_holder_concentration(&self, token: Address, total_supply: U256) -> f64 {
        if total_supply.is_zero() {
            return 0.0;
        }
        let reader = ContractReader::new(&self.chain);
        match reader.balance_of(token, token).await {
            Some(balance) => pct_of_supply(balance, total_supply),
            None => 0.0,
        }
    }

    async fn cache_analytics(&self, token: &Token, analytics: &TokenAnalytics) {
        let key = types::addr_key(token.address);
        let _ = self
            .kv
            .set_json(&channels::token_cache_key(&key), analytics, Some(std::time::Duration::from_secs(300)))
            .await;
        let _ = self.kv.zadd(channels::TOKENS_BY_CREATION, &key, token.created_at as f64).await;
        let _ = self.kv.zadd(channels::TOKENS_BY_RUG_SCORE, &key, analytics.rug_score as f64).await;
        let liquidity_usd = analytics.liquidity_usd.to_f64().unwrap_or(0.0);
        let _ = self.kv.zadd(channels::TOKENS_BY_LIQUIDITY, &key, liquidity_usd).await;
    }
}

fn bps_to_pct(bps: Option<U256>) -> f64 {
    bps.map(|v| v.as_u64() as f64 / 100.0).unwrap_or(0.0)
}

fn pct_of_supply(amount: U256, total_supply: U256) -> f64 {
    if total_supply.is_zero() {
        return 0.0;
    }
    let bps = amount.saturating_mul(U256::from(10_000u64)) / total_supply;
    bps.min(U256::from(u32::MAX)).as_u32() as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_of_supply_handles_full_ownership() {
        let supply = U256::from(1_000_000u64);
        assert_eq!(pct_of_supply(supply, supply), 100.0);
    }

    #[test]
    fn pct_of_supply_zero_supply_is_zero() {
        assert_eq!(pct_of_supply(U256::from(5u64), U256::zero()), 0.0);
    }

    #[test]
    fn bps_to_pct_converts_basis_points() {
        assert_eq!(bps_to_pct(Some(U256::from(1000u64))), 10.0);
        assert_eq!(bps_to_pct(None), 0.0);
    }
}
