//! DEX pair entity (spec.md §3 "Pair").

use crate::address::Address;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// A constant-product DEX pair, keyed by its address. Reserves are mutated
/// on every `Sync` event; everything else is set once on `PairCreated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub dex_name: String,
    /// Unix seconds.
    pub created_at: i64,
    pub block_number: u64,
}

impl Pair {
    /// True if either side of the pair is the configured base token.
    pub fn includes(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// Which side of the pair a token sits on, if any.
    pub fn side_of(&self, token: Address) -> Option<PairSide> {
        if self.token0 == token {
            Some(PairSide::Token0)
        } else if self.token1 == token {
            Some(PairSide::Token1)
        } else {
            None
        }
    }
}

/// Which reserve slot a token occupies in a `Pair`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Token0,
    Token1,
}
