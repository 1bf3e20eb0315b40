//! Standard ERC-20 `Transfer` event ABI (spec.md §3 `TRANSFER_EVENTS`).

use super::{DecodeError, Decoder};
use ethers_core::abi::{Event, EventParam, ParamType, RawLog};
use ethers_core::types::{Log, H256};
use once_cell::sync::Lazy;
use types::chain_event::{ChainEvent, LogMeta, TransferLogEvent};

/// `event Transfer(address indexed from, address indexed to, uint256 value)`
fn transfer_event() -> Event {
    Event {
        name: "Transfer".to_string(),
        inputs: vec![
            EventParam { name: "from".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "to".to_string(), kind: ParamType::Address, indexed: true },
            EventParam { name: "value".to_string(), kind: ParamType::Uint(256), indexed: false },
        ],
        anonymous: false,
    }
}

static TRANSFER: Lazy<Event> = Lazy::new(transfer_event);

/// The single topic0 this module decodes, for building `TransferMonitor`'s
/// log filter (spec.md §4.7).
pub fn event_topics() -> Vec<H256> {
    vec![TRANSFER.signature()]
}

pub fn decoder_for(topic0: H256) -> Option<Decoder> {
    if topic0 == TRANSFER.signature() {
        Some(decode_transfer)
    } else {
        None
    }
}

fn decode_transfer(log: &Log, timestamp: i64) -> Result<ChainEvent, DecodeError> {
    let raw_log = RawLog { topics: log.topics.clone(), data: log.data.to_vec() };
    let parsed = TRANSFER
        .parse_log(raw_log)
        .map_err(|e| DecodeError::AbiParse(e.to_string()))?;
    let from = parsed.params[0].value.clone().into_address().ok_or(DecodeError::MissingField("from"))?;
    let to = parsed.params[1].value.clone().into_address().ok_or(DecodeError::MissingField("to"))?;
    let value = parsed.params[2].value.clone().into_uint().ok_or(DecodeError::MissingField("value"))?;

    let meta = LogMeta {
        block_number: log
            .block_number
            .ok_or(DecodeError::MissingField("blockNumber"))?
            .as_u64(),
        tx_hash: log.transaction_hash.ok_or(DecodeError::MissingField("transactionHash"))?,
        log_index: log.log_index.ok_or(DecodeError::MissingField("logIndex"))?.as_u64(),
        timestamp,
    };

    Ok(ChainEvent::Transfer(meta, TransferLogEvent { token: log.address, from, to, value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_signature_matches_standard_erc20() {
        let sig = format!("{:#x}", TRANSFER.signature());
        assert_eq!(sig, "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
    }
}
