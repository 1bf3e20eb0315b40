//! Domain processors that turn decoded chain events into durable rows and
//! semantic events (spec.md §4.8-§4.11).

pub mod analytics;
pub mod contract_reads;
pub mod liquidity_processor;
pub mod price_provider;
pub mod token_processor;
pub mod trade_processor;

pub use analytics::{AnalyticsEngine, AnalyticsInputs};
pub use liquidity_processor::LiquidityProcessor;
pub use price_provider::{FixedPriceProvider, HttpPriceProvider, PriceProvider, PriceProviderConfig};
pub use token_processor::TokenProcessor;
pub use trade_processor::{GasInfo, TradeProcessor};
