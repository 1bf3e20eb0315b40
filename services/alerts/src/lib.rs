//! `AlertRouter` (spec.md §4.12): classifies emitted alerts by severity and
//! fans them out to subscriber queues (websocket channel, telegram queue,
//! webhook queue, critical-log sink).
//!
//! Every alert is already published onto `websocket:alerts` by
//! [`monitor::publish_semantic_event`] once `Store::commit_batch` persists
//! it (dedup by `Alert.id` already happened there — spec.md invariant 6).
//! `AlertRouter` subscribes to that same channel once (spec.md §9: "the
//! event emitter pattern... AlertRouter subscribes once") and only adds the
//! severity-gated destinations spec.md §4.12 lists beyond the websocket
//! push every severity already gets.

pub mod router;

pub use router::AlertRouter;
