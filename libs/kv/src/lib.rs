//! Fast ephemeral cache and pub/sub bus (spec.md §4.3): typed key get/set,
//! list/sorted-set/hash ops, channel publish, channel subscribe. No
//! consistency guarantee with `store` — this is a projection cache and a
//! hint bus, not source of truth.

pub mod channels;
pub mod client;
pub mod error;
pub mod pubsub;

pub use client::KvClient;
pub use error::KvError;
