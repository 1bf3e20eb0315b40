//! The three concrete monitors (`FactoryMonitor`, `DexMonitor`,
//! `TransferMonitor`) and the shared driver/state machine they run on
//! (spec.md §4.4-§4.7).

pub mod decode;
pub mod dex;
pub mod driver;
pub mod error;
pub mod factory;
pub mod handler;
pub mod metrics;
pub mod publish;
pub mod state;
pub mod transfer;
pub mod worker_pool;

pub use decode::decode_logs;
pub use dex::DexMonitor;
pub use driver::{DriverConfig, EventMonitorDriver, MonitorStatus};
pub use error::MonitorError;
pub use factory::FactoryMonitor;
pub use handler::{HandledRange, RangeHandler};
pub use publish::{publish_all, publish_semantic_event};
pub use state::MonitorState;
pub use transfer::TransferMonitor;
pub use worker_pool::WorkerPool;
