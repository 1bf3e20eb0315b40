//! Canonical event ABI definitions and decoders, translating raw logs into
//! [`types::ChainEvent`] values (spec.md §3/§4.2).

pub mod dex;
pub mod erc20;
pub mod factory;

use ethers_core::types::{Log, H256};
use thiserror::Error;
use types::ChainEvent;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown event signature: {0:#x}")]
    UnknownSignature(H256),

    #[error("ABI parse error: {0}")]
    AbiParse(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("log has no topics")]
    NoTopics,
}

/// Dispatch table entry: a topic0 this crate knows how to decode, plus the
/// decoder that turns a raw `Log` into a `ChainEvent`. Takes the
/// containing block's timestamp separately since a bare `Log` doesn't
/// carry one (spec.md §4.2: "block timestamps are resolved per-batch").
pub type Decoder = fn(&Log, i64) -> Result<ChainEvent, DecodeError>;

/// Builds the combined topic0 -> decoder map across factory, DEX, and ERC-20
/// events, so `EventMonitor` can classify a log without caring which ABI
/// module produced the signature (spec.md §4.2 event dispatch table).
pub fn decoder_for(topic0: H256) -> Option<Decoder> {
    factory::decoder_for(topic0)
        .or_else(|| dex::decoder_for(topic0))
        .or_else(|| erc20::decoder_for(topic0))
}

/// First topic of a log, i.e. the event signature hash used for dispatch.
pub fn topic0_of(log: &Log) -> Result<H256, DecodeError> {
    log.topics.first().copied().ok_or(DecodeError::NoTopics)
}
