//! EVM JSON-RPC client: a retrying, backing-off wrapper over `ethers`
//! providers plus ABI decoders that turn raw logs into [`types::ChainEvent`]
//! values (spec.md §4.1, §4.2).

pub mod abi;
pub mod backoff;
pub mod error;
pub mod provider;

pub use abi::{decoder_for, topic0_of, DecodeError};
pub use error::ChainError;
pub use provider::{ChainClient, ChainClientConfig};
