//! Bonding-curve token factory event ABIs (spec.md §3 `FACTORY_EVENTS`).

use super::{DecodeError, Decoder};
use ethers_core::abi::{Event, EventParam, ParamType, RawLog};
use ethers_core::types::{Log, H256};
use once_cell::sync::Lazy;
use types::chain_event::{
    ChainEvent, CreationFeeUpdatedEvent, FeesWithdrawnEvent, LogMeta, TokenCreatedEvent,
    TokenLaunchedEvent, TokenPurchasedEvent, TokenSoldEvent, TradingFeeUpdatedEvent,
};

/// `event TokenCreated(address indexed token, address indexed creator, string name, string symbol)`
fn token_created_event() -> Event {
    Event {
        name: "TokenCreated".to_string(),
        inputs: vec![
            EventParam { name: "token".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "creator".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "name".to_string(), kind: ParamType::String, indexed: false },
            EventParam { name: "symbol".to_string(), kind: ParamType::String, indexed: false },
        ],
        anonymous: false,
    }
}

/// `event TokenPurchased(address indexed token, address indexed buyer, uint256 amountIn, uint256 amountOut)`
fn token_purchased_event() -> Event {
    Event {
        name: "TokenPurchased".to_string(),
        inputs: vec![
            EventParam { name: "token".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "buyer".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "amountIn".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amountOut".to_string(), kind: ParamType::Uint(256), indexed: false },
        ],
        anonymous: false,
    }
}

/// `event TokenSold(address indexed token, address indexed seller, uint256 amountIn, uint256 amountOut)`
fn token_sold_event() -> Event {
    Event {
        name: "TokenSold".to_string(),
        inputs: vec![
            EventParam { name: "token".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "seller".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "amountIn".to_string(), kind: ParamType::Uint(256), indexed: false },
            EventParam { name: "amountOut".to_string(), kind: ParamType::Uint(256), indexed: false },
        ],
        anonymous: false,
    }
}

/// `event TokenLaunched(address indexed token, uint256 liquidityAdded)`
fn token_launched_event() -> Event {
    Event {
        name: "TokenLaunched".to_string(),
        inputs: vec![
            EventParam { name: "token".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "liquidityAdded".to_string(), kind: ParamType::Uint(256), indexed: false },
        ],
        anonymous: false,
    }
}

/// `event FeesWithdrawn(uint256 amount)`
fn fees_withdrawn_event() -> Event {
    Event {
        name: "FeesWithdrawn".to_string(),
        inputs: vec![EventParam { name: "amount".to_string(), kind: ParamType::Uint(256), indexed: false }],
        anonymous: false,
    }
}

/// `event CreationFeeUpdated(uint256 newFee)`
fn creation_fee_updated_event() -> Event {
    Event {
        name: "CreationFeeUpdated".to_string(),
        inputs: vec![EventParam { name: "newFee".to_string(), kind: ParamType::Uint(256), indexed: false }],
        anonymous: false,
    }
}

/// `event TradingFeeUpdated(uint32 newFeeBps)`
fn trading_fee_updated_event() -> Event {
    Event {
        name: "TradingFeeUpdated".to_string(),
        inputs: vec![EventParam { name: "newFeeBps".to_string(), kind: ParamType::Uint(32), indexed: false }],
        anonymous: false,
    }
}

static TOKEN_CREATED: Lazy<Event> = Lazy::new(token_created_event);
static TOKEN_PURCHASED: Lazy<Event> = Lazy::new(token_purchased_event);
static TOKEN_SOLD: Lazy<Event> = Lazy::new(token_sold_event);
static TOKEN_LAUNCHED: Lazy<Event> = Lazy::new(token_launched_event);
static FEES_WITHDRAWN: Lazy<Event> = Lazy::new(fees_withdrawn_event);
static CREATION_FEE_UPDATED: Lazy<Event> = Lazy::new(creation_fee_updated_event);
static TRADING_FEE_UPDATED: Lazy<Event> = Lazy::new(trading_fee_updated_event);

pub fn decoder_for(topic0: H256) -> Option<Decoder> {
    if topic0 == TOKEN_CREATED.signature() {
        Some(decode_token_created)
    } else if topic0 == TOKEN_PURCHASED.signature() {
        Some(decode_token_purchased)
    } else if topic0 == TOKEN_SOLD.signature() {
        Some(decode_token_sold)
    } else if topic0 == TOKEN_LAUNCHED.signature() {
        Some(decode_token_launched)
    } else if topic0 == FEES_WITHDRAWN.signature() {
        Some(decode_fees_withdrawn)
    } else if topic0 == CREATION_FEE_UPDATED.signature() {
        Some(decode_creation_fee_updated)
    } else if topic0 == TRADING_FEE_UPDATED.signature() {
        Some(decode_trading_fee_updated)
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

fn decode_token_created(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = TOKEN_CREATED
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let token = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("token"))?;
    let creator = parsed.params[1].value.clone().into_address().ok_or(DecodeError::MissingField("creator"))?;
    let name = parsed.params[2].value.clone().into_string().ok_or(DecodeError::MissingField("name"))?;
    let symbol = parsed.params[3].value.clone().into_string().ok_or(DecodeError::MissingField("symbol"))?;
    Ok(ChainEvent::TokenCreated(
        meta_of(log, timestamp)?,
        TokenCreatedEvent { token, creator, name, symbol },
    ))
}

fn decode_token_purchased(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = TOKEN_PURCHASED
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let token = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("token"))?;
    let buyer = parsed.params[1].value.clone().into_address().ok_or(DecodeError::MissingField("buyer"))?;
    let amount_in = parsed.params[2].value.clone().into_uint().ok_or(DecodeError::MissingField("amountIn"))?;
    let amount_out = parsed.params[3].value.clone().into_uint().ok_or(DecodeError::MissingField("amountOut"))?;
    Ok(ChainEvent::TokenPurchased(
        meta_of(log, timestamp)?,
        TokenPurchasedEvent { token, buyer, amount_in, amount_out },
    ))
}

fn decode_token_sold(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = TOKEN_SOLD
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let token = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("token"))?;
    let seller = parsed.params[1].value.clone().into_address().ok_or(DecodeError::MissingField("seller"))?;
    let amount_in = parsed.params[2].value.clone().into_uint().ok_or(DecodeError::MissingField("amountIn"))?;
    let amount_out = parsed.params[3].value.clone().into_uint().ok_or(DecodeError::MissingField("amountOut"))?;
    Ok(ChainEvent::TokenSold(
        meta_of(log, timestamp)?,
        TokenSoldEvent { token, seller, amount_in, amount_out },
    ))
}

fn decode_token_launched(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = TOKEN_LAUNCHED
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let token = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("token"))?;
    let liquidity_added = parsed.params[1]
        .value
        .clone()
        .into_uint()
        .ok_or(DecodeError::MissingField("liquidityAdded"))?;
    Ok(ChainEvent::TokenLaunched(
        meta_of(log, timestamp)?,
        TokenLaunchedEvent { token, liquidity_added },
    ))
}

fn decode_fees_withdrawn(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = FEES_WITHDRAWN
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let amount = parsed.params[0].value.clone().into_uint().ok_or(DecodeError::MissingField("amount"))?;
    Ok(ChainEvent::FeesWithdrawn(meta_of(log, timestamp)?, FeesWithdrawnEvent { amount }))
}

fn decode_creation_fee_updated(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = CREATION_FEE_UPDATED
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let new_fee = parsed.params[0].value.clone().into_uint().ok_or(DecodeError::MissingField("newFee"))?;
    Ok(ChainEvent::CreationFeeUpdated(meta_of(log, timestamp)?, CreationFeeUpdatedEvent { new_fee }))
}

fn decode_trading_fee_updated(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let parsed = TRADING_FEE_UPDATED
        .parse_log(raw_log_of(log))
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let new_fee_bps = parsed.params[0]
        .value
        .clone()
        .into_uint()
        .ok_or(DecodeError::MissingField("newFeeBps"))?
        .as_u32();
    Ok(ChainEvent::TradingFeeUpdated(meta_of(log, timestamp)?, TradingFeeUpdatedEvent { new_fee_bps }))
}
