//! Text-encoded big-integer and address conversions.
//!
//! Postgres has no native 256-bit integer; on-chain amounts are stored as
//! decimal-string `TEXT` columns and round-tripped through `U256`, the way
//! spec.md §3 calls for ("big integer, string-encoded") everywhere.

use ethers_core::types::{Address, H256, U256};
use types::addr_key;

pub fn u256_to_text(v: U256) -> String {
    v.to_string()
}

pub fn text_to_u256(s: &str) -> Result<U256, crate::StoreError> {
    U256::from_dec_str(s).map_err(|e| crate::StoreError::Decode(format!("bad u256 {s:?}: {e}")))
}

pub fn addr_to_text(a: Address) -> String {
    addr_key(a)
}

pub fn text_to_addr(s: &str) -> Result<Address, crate::StoreError> {
    s.parse()
        .map_err(|_| crate::StoreError::Decode(format!("bad address {s:?}")))
}

pub fn hash_to_text(h: H256) -> String {
    format!("{:#x}", h)
}

pub fn text_to_hash(s: &str) -> Result<H256, crate::StoreError> {
    s.parse()
        .map_err(|_| crate::StoreError::Decode(format!("bad hash {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u256_round_trips_through_decimal_text() {
        let v = U256::from(123_456_789_012_345_678u128);
        assert_eq!(text_to_u256(&u256_to_text(v)).unwrap(), v);
    }

    #[test]
    fn address_round_trips_lowercased() {
        let a: Address = "0xAbCdEf0000000000000000000000000000000000"
            .parse()
            .unwrap();
        let text = addr_to_text(a);
        assert_eq!(text, text.to_lowercase());
        assert_eq!(text_to_addr(&text).unwrap(), a);
    }

    #[test]
    fn rejects_malformed_u256_text() {
        assert!(text_to_u256("not-a-number").is_err());
    }
}
