//! `AnalyticsEngine`: rug-score composition and the honeypot heuristic
//! (spec.md §4.11).

/// Everything `AnalyticsEngine` needs that isn't itself derivable from
/// Store/KV state — the outputs of a contract-read enrichment pass plus a
/// tiny-transfer simulation (spec.md §4.11: "contract simulation of a tiny
/// transfer reverts").
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsInputs {
    pub contract_verified: bool,
    pub ownership_renounced: bool,
    pub liquidity_locked: bool,
    /// Percent, 0-100.
    pub ownership_concentration_pct: f64,
    /// Percent, 0-100.
    pub buy_tax_pct: f64,
    /// Percent, 0-100.
    pub sell_tax_pct: f64,
    /// `true` if a simulated tiny transfer reverted.
    pub simulated_transfer_reverts: bool,
}

pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Rug score, 0-100 (spec.md §4.11 composition, clamped).
    pub fn rug_score(inputs: &AnalyticsInputs) -> u8 {
        let mut score: i32 = 0;
        if !inputs.contract_verified {
            score += 20;
        }
        if !inputs.ownership_renounced {
            score += 30;
        }
        if !inputs.liquidity_locked {
            score += 20;
        }
        if inputs.ownership_concentration_pct > 50.0 {
            score += 30;
        } else if inputs.ownership_concentration_pct > 30.0 {
            score += 15;
        }
        if inputs.buy_tax_pct > 10.0 || inputs.sell_tax_pct > 10.0 {
            score += 20;
        }
        score.clamp(0, 100) as u8
    }

    /// Honeypot heuristic: a simulated tiny transfer reverts, or either
    /// tax exceeds 50% (spec.md §4.11).
    pub fn is_honeypot(inputs: &AnalyticsInputs) -> bool {
        inputs.simulated_transfer_reverts || inputs.buy_tax_pct > 50.0 || inputs.sell_tax_pct > 50.0
    }

    /// Lower `rug_score` by 20 (floor 0) on ownership renounce (spec.md
    /// §4.8 "On ownership renounced").
    pub fn apply_renounce_discount(rug_score: u8) -> u8 {
        rug_score.saturating_sub(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_trusted_token_scores_zero() {
        let inputs = AnalyticsInputs {
            contract_verified: true,
            ownership_renounced: true,
            liquidity_locked: true,
            ownership_concentration_pct: 10.0,
            buy_tax_pct: 1.0,
            sell_tax_pct: 1.0,
            simulated_transfer_reverts: false,
        };
        assert_eq!(AnalyticsEngine::rug_score(&inputs), 0);
        assert!(!AnalyticsEngine::is_honeypot(&inputs));
    }

    #[test]
    fn worst_case_clamps_to_100() {
        let inputs = AnalyticsInputs {
            contract_verified: false,
            ownership_renounced: false,
            liquidity_locked: false,
            ownership_concentration_pct: 90.0,
            buy_tax_pct: 60.0,
            sell_tax_pct: 60.0,
            simulated_transfer_reverts: true,
        };
        assert_eq!(AnalyticsEngine::rug_score(&inputs), 100);
        assert!(AnalyticsEngine::is_honeypot(&inputs));
    }

    #[test]
    fn moderate_concentration_adds_partial_score() {
        let inputs = AnalyticsInputs {
            contract_verified: true,
            ownership_renounced: true,
            liquidity_locked: true,
            ownership_concentration_pct: 35.0,
            buy_tax_pct: 1.0,
            sell_tax_pct: 1.0,
            simulated_transfer_reverts: false,
        };
        assert_eq!(AnalyticsEngine::rug_score(&inputs), 15);
    }

    #[test]
    fn high_tax_alone_is_not_a_honeypot_below_50_pct() {
        let inputs = AnalyticsInputs {
            contract_verified: true,
            ownership_renounced: true,
            liquidity_locked: true,
            ownership_concentration_pct: 0.0,
            buy_tax_pct: 15.0,
            sell_tax_pct: 15.0,
            simulated_transfer_reverts: false,
        };
        assert!(!AnalyticsEngine::is_honeypot(&inputs));
    }
}
