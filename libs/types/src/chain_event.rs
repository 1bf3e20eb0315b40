//! Decoded chain events as a tagged sum type.
//!
//! spec.md §9 calls for replacing string-dispatched event handling with a
//! decode-once sum type; this is that type. `chain-client`'s ABI decoders
//! produce `ChainEvent` values, and `monitor`'s handlers match on them.

use crate::address::Address;
use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};

/// Metadata common to every log, independent of which event it decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMeta {
    pub block_number: u64,
    pub tx_hash: H256,
    pub log_index: u64,
    /// Unix seconds, taken from the containing block.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCreatedEvent {
    pub token: Address,
    pub creator: Address,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPurchasedEvent {
    pub token: Address,
    pub buyer: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenSoldEvent {
    pub token: Address,
    pub seller: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenLaunchedEvent {
    pub token: Address,
    pub liquidity_added: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeesWithdrawnEvent {
    pub amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreationFeeUpdatedEvent {
    pub new_fee: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingFeeUpdatedEvent {
    pub new_fee_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCreatedEvent {
    pub pair: Address,
    pub token0: Address,
    pub token1: Address,
    pub dex_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub pair: Address,
    pub sender: Address,
    pub to: Address,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
}

impl SwapEvent {
    /// Which side of the pool the swap is buying/selling, by which of the
    /// four amounts is nonzero (spec.md §4.6).
    pub fn token_in_is_token0(&self) -> bool {
        !self.amount0_in.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MintEvent {
    pub pair: Address,
    pub sender: Address,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnEvent {
    pub pair: Address,
    pub sender: Address,
    pub to: Address,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub pair: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferLogEvent {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// A decoded log, tagged by which contract event it came from. Decoded
/// exactly once, in `chain-client`'s ABI layer; everything downstream
/// matches on the variant instead of re-inspecting topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainEvent {
    TokenCreated(LogMeta, TokenCreatedEvent),
    TokenPurchased(LogMeta, TokenPurchasedEvent),
    TokenSold(LogMeta, TokenSoldEvent),
    TokenLaunched(LogMeta, TokenLaunchedEvent),
    FeesWithdrawn(LogMeta, FeesWithdrawnEvent),
    CreationFeeUpdated(LogMeta, CreationFeeUpdatedEvent),
    TradingFeeUpdated(LogMeta, TradingFeeUpdatedEvent),
    PairCreated(LogMeta, PairCreatedEvent),
    Swap(LogMeta, SwapEvent),
    Mint(LogMeta, MintEvent),
    Burn(LogMeta, BurnEvent),
    Sync(LogMeta, SyncEvent),
    Transfer(LogMeta, TransferLogEvent),
}

impl ChainEvent {
    pub fn meta(&self) -> LogMeta {
        match self {
            ChainEvent::TokenCreated(m, _)
            | ChainEvent::TokenPurchased(m, _)
            | ChainEvent::TokenSold(m, _)
            | ChainEvent::TokenLaunched(m, _)
            | ChainEvent::FeesWithdrawn(m, _)
            | ChainEvent::CreationFeeUpdated(m, _)
            | ChainEvent::TradingFeeUpdated(m, _)
            | ChainEvent::PairCreated(m, _)
            | ChainEvent::Swap(m, _)
            | ChainEvent::Mint(m, _)
            | ChainEvent::Burn(m, _)
            | ChainEvent::Sync(m, _)
            | ChainEvent::Transfer(m, _) => *m,
        }
    }
}
