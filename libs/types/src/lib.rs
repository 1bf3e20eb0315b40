//! Shared domain types for the chain indexing and fan-out engine.
//!
//! Every entity in the data model (spec.md §3) lives here as a plain,
//! serde-serializable struct. Nothing in this crate talks to Postgres,
//! Redis, or the chain directly — that is `store`, `kv`, and `chain-client`.

pub mod address;
pub mod alert;
pub mod analytics;
pub mod chain_event;
pub mod cursor;
pub mod holder;
pub mod liquidity;
pub mod pair;
pub mod semantic;
pub mod token;
pub mod trade;
pub mod transfer;

pub use address::{addr_key, Address};
pub use alert::{Alert, AlertSeverity, AlertType};
pub use analytics::TokenAnalytics;
pub use chain_event::{
    BurnEvent, ChainEvent, CreationFeeUpdatedEvent, FeesWithdrawnEvent, LogMeta, MintEvent,
    PairCreatedEvent, SwapEvent, SyncEvent, TokenCreatedEvent, TokenLaunchedEvent,
    TokenPurchasedEvent, TokenSoldEvent, TradingFeeUpdatedEvent, TransferLogEvent,
};
pub use cursor::Cursor;
pub use holder::HolderBalance;
pub use liquidity::{LiquidityEvent, LiquidityEventKind};
pub use pair::Pair;
pub use semantic::SemanticEvent;
pub use token::{Token, TokenMetadata, TokenStatus, TradingControls};
pub use trade::Trade;
pub use transfer::TransferEvent;

/// Re-exported big integer type used for on-chain amounts.
pub use ethers_core::types::U256;
