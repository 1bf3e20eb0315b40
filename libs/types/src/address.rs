//! Address handling.
//!
//! The data model keys every entity by a lowercase-hex 20-byte address
//! (spec.md §3). `ethers_core::types::Address` is the in-memory
//! representation; `addr_key` is the canonical string form used as a
//! database key and in KV channel payloads.

pub use ethers_core::types::Address;

/// Canonical lowercase-hex representation of an address, e.g. `0xabc...`.
///
/// Used everywhere the data model calls for an address as a map/database
/// key so that two different-cased encodings of the same address never
/// collide.
pub fn addr_key(address: Address) -> String {
    format!("{:#x}", address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_mixed_case_input() {
        let a: Address = "0xAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAaAa"
            .parse()
            .unwrap();
        assert_eq!(addr_key(a), "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    }
}
