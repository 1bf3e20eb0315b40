//! Token registry entity (spec.md §3 "Token").

use crate::address::Address;
use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a token, as tracked by `TokenProcessor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    /// Observed on the bonding-curve factory, not yet launched to a DEX.
    Created,
    /// Liquidity has been added and the token launched to a DEX pair.
    Launched,
    /// The bonding curve has graduated the token (alias used by some
    /// factories for `Launched`; kept distinct per spec.md §3).
    Graduated,
    /// Trading controls report the token as actively tradeable.
    TradingEnabled,
}

/// Optional off-chain metadata surfaced by the factory or a metadata URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

/// On-chain trading controls read from the token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingControls {
    pub max_wallet: Option<U256>,
    pub max_transaction: Option<U256>,
    pub trading_enabled: bool,
}

impl Default for TradingControls {
    fn default() -> Self {
        Self {
            max_wallet: None,
            max_transaction: None,
            trading_enabled: false,
        }
    }
}

/// A token in the registry, keyed by its lowercase address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub creator: Address,
    /// Unix seconds.
    pub created_at: i64,
    pub block_number: u64,
    pub tx_hash: H256,
    pub status: TokenStatus,
    pub ownership_renounced: bool,
    pub metadata: Option<TokenMetadata>,
    pub trading_controls: TradingControls,
    /// Denormalised counter, owned exclusively by `TransferMonitor`
    /// (spec.md §5 partitioning rule).
    pub holders_count: i64,
}

impl Token {
    /// The bonding curve mints a fixed 1e24 (1,000,000 with 18 decimals)
    /// supply on creation (spec.md §4.5).
    pub fn default_total_supply() -> U256 {
        U256::from(10).pow(U256::from(24))
    }

    /// Decimals used by every bonding-curve-minted token (spec.md §4.5).
    pub const DEFAULT_DECIMALS: u8 = 18;
}
