use tracing::warn;

use crate::error::RiskError;
use crate::RiskResult;

use super::engine::PortfolioOptimizer;
use super::types::CapitalAllocation;

/// Largest multiple of capital placed in the tangency portfolio.
pub const MAX_RISKY_WEIGHT: f64 = 5.0;

const MIN_EXCESS_RETURN: f64 = 1e-12;

impl PortfolioOptimizer {
    /// Split capital between the max-Sharpe (tangency) portfolio and the
    /// risk-free asset.
    ///
    /// A target return gives `w = (target - rf) / (R_t - rf)`; a target
    /// volatility gives `w = target / σ_t`; with neither the whole capital
    /// goes into the tangency portfolio. `w` is clamped to `[0, 5]`.
    pub fn calculate_capital_allocation(
        &self,
        target_return: Option<f64>,
        target_volatility: Option<f64>,
    ) -> RiskResult<CapitalAllocation> {
        if target_return.is_some_and(|t| !t.is_finite()) {
            return Err(RiskError::invalid("target_return", "must be finite"));
        }
        if target_volatility.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(RiskError::invalid(
                "target_volatility",
                "must be finite and non-negative",
            ));
        }

        let tangency = self.optimize_max_sharpe(self.search.simulations)?;
        let rf = self.risk_free_rate;
        let excess = tangency.expected_return - rf;
        let mut warnings = tangency.warnings.clone();

        let raw = match (target_return, target_volatility) {
            (Some(target), vol) => {
                if vol.is_some() {
                    warnings.push("Target volatility ignored when a target return is given".into());
                }
                if excess <= MIN_EXCESS_RETURN {
                    warn!(excess, "tangency portfolio has no excess return");
                    warnings.push(
                        "Tangency portfolio does not beat the risk-free rate; holding the risk-free asset"
                            .into(),
                    );
                    0.0
                } else {
                    (target - rf) / excess
                }
            }
            (None, Some(vol)) => {
                if tangency.volatility > 0.0 {
                    vol / tangency.volatility
                } else {
                    warnings
                        .push("Tangency volatility is zero; holding the risk-free asset".into());
                    0.0
                }
            }
            (None, None) => 1.0,
        };

        let risky_weight = raw.clamp(0.0, MAX_RISKY_WEIGHT);
        if (risky_weight - raw).abs() > f64::EPSILON {
            warnings.push(format!(
                "Risky weight {raw:.4} clamped to {risky_weight:.4}"
            ));
        }

        Ok(CapitalAllocation {
            tangency_weights: tangency.weights,
            tangency_return: tangency.expected_return,
            tangency_volatility: tangency.volatility,
            tangency_sharpe: tangency.sharpe_ratio,
            risky_weight,
            risk_free_weight: 1.0 - risky_weight,
            expected_return: rf + risky_weight * excess,
            volatility: risky_weight * tangency.volatility,
            sharpe_ratio: if risky_weight > 0.0 {
                tangency.sharpe_ratio
            } else {
                0.0
            },
            leveraged: risky_weight > 1.0,
            warnings,
        })
    }
}
