//! Holder balance entity (spec.md §3 "HolderBalance").

use crate::address::Address;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// A single holder's balance of a single token. Invariant (1): rows with
/// `balance == 0` do not exist — they are deleted by the store as part of
/// the same batch transaction that would otherwise zero them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderBalance {
    pub token_address: Address,
    pub holder_address: Address,
    pub balance: U256,
    /// Unix seconds.
    pub last_updated: i64,
}
