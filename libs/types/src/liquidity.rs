//! Liquidity (Mint/Burn) entity (spec.md §3 "LiquidityEvent").

use crate::address::Address;
use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};

/// Whether a liquidity event added or removed liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiquidityEventKind {
    Add,
    Remove,
}

/// A single Mint or Burn, append-only and keyed by `(tx_hash, log_index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityEvent {
    pub tx_hash: H256,
    pub log_index: u64,
    pub block_number: u64,
    /// Unix seconds.
    pub timestamp: i64,
    pub pair: Address,
    pub provider: Address,
    pub token0_amount: U256,
    pub token1_amount: U256,
    pub liquidity: U256,
    pub kind: LiquidityEventKind,
}
