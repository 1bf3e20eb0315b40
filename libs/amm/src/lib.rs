//! Constant-product DEX mathematics.
//!
//! Scoped to the V2-style pairs this system watches (spec.md §1: "standard
//! constant-product DEX pairs"). V3 concentrated-liquidity and optimal
//! arbitrage-sizing math have no counterpart in this system and are not
//! carried over — see `DESIGN.md`.

pub mod price_impact;
pub mod v2_math;

pub use price_impact::{price_impact_pct, reserve_removal_pct};
pub use v2_math::{V2Math, V2PoolState};
