//! Uniswap V2-compatible DEX event ABIs (spec.md §3 `DEX_EVENTS`). Event
//! shapes are the standard V2 pair events also used by most forks.

use super::{DecodeError, Decoder};
use ethers_core::abi::{Event, EventParam, ParamType, RawLog};
use ethers_core::types::{Log, H256};
use once_cell::sync::Lazy;
use types::chain_event::{
    BurnEvent, ChainEvent, LogMeta, MintEvent, PairCreatedEvent, SwapEvent, SyncEvent,
};

/// `event PairCreated(address indexed token0, address indexed token1, address pair, uint256)`
fn pair_created_event() -> Event {
    Event {
        name: "PairCreated".to_string(),
        inputs: vec![
            EventParam { name: "token0".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "token1".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "pair".to_string(), kind: ParamType::Address, indexed: false },
            EventParam { name: "allPairsLength".to_string(), kind: ParamType::Uint(256), indexed: false },
        ],
        anonymous: false,
    }
}

/// `event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to)`
fn swap_event() -> Event {
    Event {
        name: "Swap".to_string(),
        inputs: vec![
            EventParam { name: "sender".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "amount0In".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amount1In".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amount0Out".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amount1Out".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "to".to_string(), kind: ParamType::Address, indexed: true },
        ],
        anonymous: false,
    }
}

/// `event Mint(address indexed sender, uint256 amount0, uint256 amount1)`
fn mint_event() -> Event {
    Event {
        name: "Mint".to_string(),
        inputs: vec![
            EventParam { name: "sender".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "amount0".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amount1".to_string(), kind: ParamType::Uint(256), indexed: false },
        ],
        anonymous: false,
    }
}

/// `event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to)`
fn burn_event() -> Event {
    Event {
        name: "Burn".to_string(),
        inputs: vec![
            EventParam { name: "sender".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "amount0".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amount1".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "to".to_string(), kind: ParamType::Address, indexed: true },
        ],
        anonymous: false,
    }
}

/// `event Sync(uint112 reserve0, uint112 reserve1)`
fn sync_event() -> Event {
    Event {
        name: "Sync".to_string(),
        inputs: vec![
            EventParam { name: "reserve0".to_string(), kind: ParamType::Uint(112), indexed: false },
            EventParam { name: "reserve1".to_string(), kind: ParamType::Uint(112), indexed: false },
        ],
        anonymous: false,
    }
}

static PAIR_CREATED: Lazy<Event> = Lazy::new(pair_created_event);
static SWAP: Lazy<Event> = Lazy::new(swap_event);
static MINT: Lazy<Event> = Lazy::new(mint_event);
static BURN: Lazy<Event> = Lazy::new(burn_event);
static SYNC: Lazy<Event> = Lazy::new(sync_event);

/// Every topic0 this module decodes, for building `DexMonitor`'s log
/// filter (spec.md §4.6).
pub fn event_topics() -> Vec<H256> {
    vec![
        PAIR_CREATED.signature(),
        SWAP.signature(),
        MINT.signature(),
        BURN.signature(),
        SYNC.signature(),
    ]
}

pub fn decoder_for(topic0: H256) -> Option<Decoder> {
    if topic0 == PAIR_CREATED.signature() {
        Some(decode_pair_created)
    } else if topic0 == SWAP.signature() {
        Some(decode_swap)
    } else if topic0 == MINT.signature() {
        Some(decode_mint)
    } else if topic0 == BURN.signature() {
        Some(decode_burn)
    } else if topic0 == SYNC.signature() {
        Some(decode_sync)
    } else {
        None
    }
}

fn raw_log_of(log: &Log) -> RawLog {
    RawLog { topics: log.topics.clone(), data: log.data.to_vec() }
}

fn meta_of(log: &Log, timestamp: i64) -> Result<LogMeta, DecodeError> {
    Ok(LogMeta {
        block_number: log
            .block_number
            .ok_or(DecodeError::MissingField("blockNumber"))?
            .as_u64(),
        tx_hash: log.transaction_hash.ok_or(DecodeError::MissingField("transactionHash"))?,
        log_index: log.log_index.ok_or(DecodeError::MissingField("logIndex"))?.as_u64(),
        timestamp,
    })
}

/// Which DEX this pair's factory corresponds to is not carried on-chain by
/// `PairCreated` itself; `EventMonitor` fills `dex_name` in from the
/// `DexFactoryConfig` entry whose address matches the log's emitter, so the
/// decoder leaves it blank here rather than guessing.
fn decode_pair_created(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = PAIR_CREATED
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let token0 = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("token0"))?;
    let token1 = parsed.params[1].value.clone().into_address().ok_or(DecodeError::MissingField("token1"))?;
    let pair = parsed.params[2].value.clone().into_address().ok_or(DecodeError::MissingField("pair"))?;
    Ok(ChainEvent::PairCreated(
        meta_of(log, timestamp)?,
        PairCreatedEvent { pair, token0, token1, dex_name: String::new() },
    ))
}

fn decode_swap(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = SWAP
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let sender = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("sender"))?;
    let amount0_in = parsed.params[1].value.clone().into_uint().ok_or(DecodeError::MissingField("amount0In"))?;
    let amount1_in = parsed.params[2].value.clone().into_uint().ok_or(DecodeError::MissingField("amount1In"))?;
    let amount0_out = parsed.params[3].value.clone().into_uint().ok_or(DecodeError::MissingField("amount0Out"))?;
    let amount1_out = parsed.params[4].value.clone().into_uint().ok_or(DecodeError::MissingField("amount1Out"))?;
    let to = parsed.params[5].value.clone().into_address().ok_or(DecodeError::MissingField("to"))?;
    Ok(ChainEvent::Swap(
        meta_of(log, timestamp)?,
        SwapEvent { pair: log.address, sender, to, amount0_in, amount1_in, amount0_out, amount1_out },
    ))
}

fn decode_mint(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = MINT
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let sender = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("sender"))?;
    let amount0 = parsed.params[1].value.clone().into_uint().ok_or(DecodeError::MissingField("amount0"))?;
    let amount1 = parsed.params[2].value.clone().into_uint().ok_or(DecodeError::MissingField("amount1"))?;
    Ok(ChainEvent::Mint(
        meta_of(log, timestamp)?,
        MintEvent { pair: log.address, sender, amount0, amount1 },
    ))
}

fn decode_burn(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = BURN
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let sender = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("sender"))?;
    let amount0 = parsed.params[1].value.clone().into_uint().ok_or(DecodeError::MissingField("amount0"))?;
    let amount1 = parsed.params[2].value.clone().into_uint().ok_or(DecodeError::MissingField("amount1"))?;
    let to = parsed.params[3].value.clone().into_address().ok_or(DecodeError::MissingField("to"))?;
    Ok(ChainEvent::Burn(
        meta_of(log, timestamp)?,
        BurnEvent { pair: log.address, sender, to, amount0, amount1 },
    ))
}

fn decode_sync(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = SYNC
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let reserve0 = parsed.params[0].value.clone().into_uint().ok_or(DecodeError::MissingField("reserve0"))?;
    let reserve1 = parsed.params[1].value.clone().into_uint().ok_or(DecodeError::MissingField("reserve1"))?;
    Ok(ChainEvent::Sync(meta_of(log, timestamp)?, SyncEvent { pair: log.address, reserve0, reserve1 }))
}
