//! Property tests for the price-impact and reserve-removal math (spec.md §8).
//!
//! Bounded to `u64`-range inputs converted to `U256` — wide enough to
//! exercise the fixed-point scaling without approaching the saturating
//! multiplication's overflow boundary, which is already covered by the
//! unit tests in `price_impact.rs`.

use amm::{price_impact_pct, reserve_removal_pct};
use ethers_core::types::U256;
use proptest::prelude::*;

proptest! {
    /// Impact is never negative and never NaN/infinite for well-formed,
    /// non-degenerate inputs (spec.md §8: impact is reported as a percent).
    #[test]
    fn price_impact_is_always_non_negative_and_finite(
        reserve_in in 1u64..=1_000_000_000_000,
        reserve_out in 1u64..=1_000_000_000_000,
        amount_in in 1u64..=1_000_000_000,
        amount_out in 1u64..=1_000_000_000,
    ) {
        let impact = price_impact_pct(
            U256::from(reserve_in),
            U256::from(reserve_out),
            U256::from(amount_in),
            U256::from(amount_out),
        );
        prop_assert!(impact.is_finite());
        prop_assert!(impact >= 0.0);
    }

    /// A fill that is an exact integer multiple of the pool's ratio (no
    /// rounding in the construction) has zero impact, regardless of the
    /// reserves' absolute scale.
    #[test]
    fn exact_ratio_fill_has_zero_impact(
        reserve_in in 1u64..=100_000,
        reserve_out in 1u64..=100_000,
        n in 1u64..=1_000,
    ) {
        // amount_in/amount_out are both the reserves scaled by the same
        // integer factor `n`, so the fill ratio matches the pool ratio
        // exactly with no floor-division remainder.
        let amount_in = reserve_in * n;
        let amount_out = reserve_out * n;

        let impact = price_impact_pct(
            U256::from(reserve_in),
            U256::from(reserve_out),
            U256::from(amount_in),
            U256::from(amount_out),
        );
        prop_assert!(impact < 0.0001);
    }

    /// Removing more of either side never reports a *smaller* removal
    /// percentage than removing less, holding reserves fixed.
    #[test]
    fn reserve_removal_pct_is_monotonic_in_removed_amount(
        reserve0 in 1_000u64..=1_000_000_000,
        reserve1 in 1_000u64..=1_000_000_000,
        removed_small in 0u64..=500,
        extra in 0u64..=500,
    ) {
        let removed_large = removed_small + extra;
        prop_assume!(removed_large <= reserve0 && removed_large <= reserve1);

        let pct_small = reserve_removal_pct(
            U256::from(reserve0),
            U256::from(reserve1),
            U256::from(removed_small),
            U256::from(removed_small),
        );
        let pct_large = reserve_removal_pct(
            U256::from(reserve0),
            U256::from(reserve1),
            U256::from(removed_large),
            U256::from(removed_large),
        );
        prop_assert!(pct_large >= pct_small - 0.01);
    }

    /// Removal percentage never exceeds 100 when the removed amount never
    /// exceeds the pre-removal reserve on either side.
    #[test]
    fn reserve_removal_pct_is_bounded_by_100(
        reserve0 in 1u64..=1_000_000_000,
        reserve1 in 1u64..=1_000_000_000,
        removed0 in 0u64..=1_000_000_000,
        removed1 in 0u64..=1_000_000_000,
    ) {
        prop_assume!(removed0 <= reserve0 && removed1 <= reserve1);
        let pct = reserve_removal_pct(
            U256::from(reserve0),
            U256::from(reserve1),
            U256::from(removed0),
            U256::from(removed1),
        );
        prop_assert!(pct <= 100.01);
    }

    /// Removing nothing never triggers a nonzero removal percentage.
    #[test]
    fn no_removal_is_zero_pct(reserve0 in 1u64..=1_000_000_000, reserve1 in 1u64..=1_000_000_000) {
        let pct = reserve_removal_pct(
            U256::from(reserve0),
            U256::from(reserve1),
            U256::zero(),
            U256::zero(),
        );
        prop_assert_eq!(pct, 0.0);
    }
}
