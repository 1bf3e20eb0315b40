//! Failure-tolerant ERC-20 / trading-control contract reads (spec.md
//! §4.8: "enrichment reads use defaults on any `ContractRevert` or
//! `Transient` failure rather than blocking the pipeline").
//!
//! `ChainClient::call` only speaks raw calldata, so this module owns the
//! handful of 4-byte selectors the enrichment pass needs.

use chain_client::{ChainClient, ChainError};
use ethers_core::abi::{encode, Token as AbiToken};
use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::keccak256;

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn calldata_no_args(signature: &str) -> Bytes {
    Bytes::from(selector(signature).to_vec())
}

fn calldata_address(signature: &str, arg: Address) -> Bytes {
    let mut data = selector(signature).to_vec();
    data.extend(encode(&[AbiToken::Address(arg)]));
    Bytes::from(data)
}

fn decode_uint(bytes: &Bytes) -> Option<U256> {
    (bytes.len() >= 32).then(|| U256::from_big_endian(&bytes[0..32]))
}

fn decode_bool(bytes: &Bytes) -> Option<bool> {
    decode_uint(bytes).map(|v| !v.is_zero())
}

fn decode_address(bytes: &Bytes) -> Option<Address> {
    (bytes.len() >= 32).then(|| Address::from_slice(&bytes[12..32]))
}

/// Enrichment reads against a single token contract, each tolerant of any
/// `ChainError` (reverts, timeouts) by falling back to `None`.
pub struct ContractReader<'a> {
    client: &'a ChainClient,
}

impl<'a> ContractReader<'a> {
    pub fn new(client: &'a ChainClient) -> Self {
        Self { client }
    }

    async fn read_uint(&self, token: Address, signature: &str) -> Option<U256> {
        self.client.call(token, calldata_no_args(signature), None).await.ok().and_then(|b| decode_uint(&b))
    }

    async fn read_bool(&self, token: Address, signature: &str) -> Option<bool> {
        self.client.call(token, calldata_no_args(signature), None).await.ok().and_then(|b| decode_bool(&b))
    }

    pub async fn total_supply(&self, token: Address) -> Option<U256> {
        self.read_uint(token, "totalSupply()").await
    }

    pub async fn owner(&self, token: Address) -> Option<Address> {
        self.client.call(token, calldata_no_args("owner()"), None).await.ok().and_then(|b| decode_address(&b))
    }

    /// Renounced ownership heuristic: `owner()` resolves to the zero
    /// address (spec.md §4.8 "On ownership renounced").
    pub async fn ownership_renounced(&self, token: Address) -> bool {
        matches!(self.owner(token).await, Some(addr) if addr == Address::zero())
    }

    pub async fn trading_enabled(&self, token: Address) -> Option<bool> {
        self.read_bool(token, "tradingEnabled()").await
    }

    pub async fn max_wallet_amount(&self, token: Address) -> Option<U256> {
        self.read_uint(token, "maxWalletAmount()").await
    }

    pub async fn max_transaction_amount(&self, token: Address) -> Option<U256> {
        self.read_uint(token, "maxTransactionAmount()").await
    }

    /// Basis points, 0-10000.
    pub async fn buy_tax_bps(&self, token: Address) -> Option<U256> {
        self.read_uint(token, "buyTaxBps()").await
    }

    /// Basis points, 0-10000.
    pub async fn sell_tax_bps(&self, token: Address) -> Option<U256> {
        self.read_uint(token, "sellTaxBps()").await
    }

    pub async fn balance_of(&self, token: Address, holder: Address) -> Option<U256> {
        self.client
            .call(token, calldata_address("balanceOf(address)", holder), None)
            .await
            .ok()
            .and_then(|b| decode_uint(&b))
    }

    /// A simulated transfer of 1 wei from `token`'s own address, as a
    /// static call. A `ContractRevert` is a strong honeypot signal; any
    /// other failure mode (timeout, rate limit) is not treated as one
    /// (spec.md §4.11: "contract simulation of a tiny transfer reverts").
    pub async fn simulated_transfer_reverts(&self, token: Address) -> bool {
        let mut data = selector("transfer(address,uint256)").to_vec();
        data.extend(encode(&[AbiToken::Address(token), AbiToken::Uint(U256::one())]));
        matches!(
            self.client.call(token, Bytes::from(data), None).await,
            Err(ChainError::ContractRevert(_))
        )
    }
}
