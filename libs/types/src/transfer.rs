//! ERC-20 transfer entity (spec.md §3 "TransferEvent").

use crate::address::Address;
use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};

/// A single ERC-20 `Transfer` log. Unique on `(tx_hash, log_index)`;
/// duplicate deliveries are ignored by the store's unique constraint
/// (spec.md invariant 5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub tx_hash: H256,
    pub log_index: u64,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub token_address: Address,
    pub block_number: u64,
    /// Unix seconds.
    pub timestamp: i64,
}

impl TransferEvent {
    pub fn is_mint(&self) -> bool {
        self.from == Address::zero()
    }

    pub fn is_burn(&self) -> bool {
        self.to == Address::zero()
    }
}
