//! DEX trade entity (spec.md §3 "Trade").

use crate::address::Address;
use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};

/// A single DEX swap, append-only and keyed by `(tx_hash, log_index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub tx_hash: H256,
    pub log_index: u64,
    pub block_number: u64,
    /// Unix seconds.
    pub timestamp: i64,
    pub pair: Address,
    pub trader: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub price_impact: f64,
    pub gas_used: Option<u64>,
    pub gas_price_wei: Option<U256>,
}
