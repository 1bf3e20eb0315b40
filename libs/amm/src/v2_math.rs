//! Uniswap V2-style constant-product math with exact `Decimal` arithmetic.

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Pool reserves and fee structure for a V2-style AMM.
#[derive(Debug, Clone, Copy)]
pub struct V2PoolState {
    pub reserve_in: Decimal,
    pub reserve_out: Decimal,
    pub fee_bps: u32,
}

pub struct V2Math;

impl V2Math {
    /// Exact output amount for the `x*y=k` formula, after fees.
    pub fn calculate_output_amount(
        amount_in: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
        fee_bps: u32,
    ) -> Result<Decimal> {
        if amount_in <= dec!(0) {
            bail!("input amount must be positive");
        }
        if reserve_in <= dec!(0) || reserve_out <= dec!(0) {
            bail!("reserves must be positive");
        }

        let fee_multiplier = Decimal::from(10_000 - fee_bps) / dec!(10000);
        let amount_in_after_fee = amount_in * fee_multiplier;

        let numerator = amount_in_after_fee * reserve_out;
        let denominator = reserve_in + amount_in_after_fee;

        Ok(numerator / denominator)
    }

    /// Slippage versus the ideal (infinite-liquidity) rate, as a percent.
    pub fn calculate_slippage(
        amount_in: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
        fee_bps: u32,
    ) -> Result<Decimal> {
        let ideal_rate = reserve_out / reserve_in;
        let ideal_output = amount_in * ideal_rate;
        let actual_output = Self::calculate_output_amount(amount_in, reserve_in, reserve_out, fee_bps)?;
        Ok((ideal_output - actual_output) / ideal_output * dec!(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_amount_matches_known_value() {
        let output =
            V2Math::calculate_output_amount(dec!(100), dec!(1000), dec!(2000), 30).unwrap();
        assert!((output - dec!(181.32)).abs() < dec!(0.01));
    }

    #[test]
    fn rejects_non_positive_reserves() {
        assert!(V2Math::calculate_output_amount(dec!(1), dec!(0), dec!(10), 30).is_err());
    }
}
