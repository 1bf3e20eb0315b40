//! Price-impact and reserve-removal math (spec.md §8).
//!
//! Uses `U256` fixed-point arithmetic scaled by `1e18` so the hot path
//! (every DEX swap) never touches floating point; only the final
//! percentage is converted to `f64` for storage and alert thresholds.

use ethers_core::types::U256;

const WAD: u64 = 1_000_000_000_000_000_000;
const BPS: u32 = 10_000;

/// `impact% = |(expected - actual)| * 100 / expected`, where
/// `expected = reserveOut * 1e18 / reserveIn` and
/// `actual = amountOut * 1e18 / amountIn` (spec.md §8, exact formula).
///
/// Returns `0.0` if `reserve_in`, `reserve_out`, or `amount_in` is zero —
/// there is no meaningful impact to report for a degenerate trade.
pub fn price_impact_pct(
    reserve_in: U256,
    reserve_out: U256,
    amount_in: U256,
    amount_out: U256,
) -> f64 {
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_in.is_zero() {
        return 0.0;
    }

    let wad = U256::from(WAD);
    let expected = reserve_out.saturating_mul(wad) / reserve_in;
    if expected.is_zero() {
        return 0.0;
    }
    let actual = amount_out.saturating_mul(wad) / amount_in;

    let diff = if expected > actual {
        expected - actual
    } else {
        actual - expected
    };

    // diff * 100 / expected, done in U256 then converted, to avoid
    // precision loss converting `diff`/`expected` to f64 independently.
    let hundred = U256::from(100u64);
    let impact = diff.saturating_mul(hundred) / expected;
    u256_to_f64(impact)
}

/// The larger of the two percentages of reserve removed by a Burn, versus
/// the pool's reserves *before* the burn was applied (spec.md §4.10,
/// "Catastrophic liquidity pull" scenario).
pub fn reserve_removal_pct(
    reserve0_before: U256,
    reserve1_before: U256,
    removed0: U256,
    removed1: U256,
) -> f64 {
    let pct0 = removal_bps(reserve0_before, removed0);
    let pct1 = removal_bps(reserve1_before, removed1);
    let bps = pct0.max(pct1);
    bps as f64 / 100.0
}

fn removal_bps(reserve_before: U256, removed: U256) -> u32 {
    if reserve_before.is_zero() {
        return 0;
    }
    let bps = removed.saturating_mul(U256::from(BPS)) / reserve_before;
    bps.min(U256::from(u32::MAX)).as_u32()
}

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_impact_for_perfectly_matching_ratio() {
        // reserves 1000:2000, amount_in=10, amount_out matching the ratio exactly
        let impact = price_impact_pct(
            U256::from(1000u64),
            U256::from(2000u64),
            U256::from(10u64),
            U256::from(20u64),
        );
        assert!(impact < 0.0001);
    }

    #[test]
    fn nonzero_impact_for_worse_than_ratio_fill() {
        let impact = price_impact_pct(
            U256::from(1000u64),
            U256::from(2000u64),
            U256::from(10u64),
            U256::from(18u64),
        );
        assert!(impact > 0.0);
    }

    #[test]
    fn burn_removing_80_percent_of_both_sides_is_detected() {
        let pct = reserve_removal_pct(
            U256::from(1000u64),
            U256::from(2_000_000_000u64),
            U256::from(800u64),
            U256::from(1_600_000_000u64),
        );
        assert!((pct - 80.0).abs() < 0.01);
    }

    #[test]
    fn burn_removing_90_percent_of_one_side_takes_the_max() {
        let pct = reserve_removal_pct(
            U256::from(1000u64),
            U256::from(2_000_000_000u64),
            U256::from(900u64),
            U256::from(1_000_000_000u64),
        );
        assert!((pct - 90.0).abs() < 0.01);
    }
}
