//! Per-monitor cursor entity (spec.md §3 "Cursor").

use serde::{Deserialize, Serialize};

/// The last fully processed block for a named monitor. Advances
/// monotonically (spec.md invariant 4); the name is e.g. `"factory"`,
/// `"dex:quickswap"`, `"transfer:0xabc..."`, or `"staking"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub processor: String,
    pub last_block: u64,
}
