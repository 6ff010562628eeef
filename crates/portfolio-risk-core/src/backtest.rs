//! VaR backtesting: realized portfolio losses against a VaR threshold,
//! scored with the Kupiec proportion-of-failures test.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RiskError;
use crate::series::weighted_sum;
use crate::var::individual::validate_var_parameters;
use crate::var::kupiec::{calculate_kupiec_test, kupiec_p_value, KUPIEC_CRITICAL_VALUE};
use crate::var::portfolio::{calculate_portfolio_var, prepare_portfolio};
use crate::RiskResult;

/// Largest gap between observed and expected exceedance rates that passes.
pub const PASS_RATE_TOLERANCE: f64 = 0.02;

/// A period whose realized loss exceeded the VaR threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachEvent {
    pub period: usize,
    /// Placeholder date label, `day-{period}`.
    pub label: String,
    pub loss: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub exceedances: usize,
    pub observations: usize,
    pub exceedance_rate: f64,
    pub expected_rate: f64,
    pub kupiec_statistic: f64,
    pub p_value: f64,
    pub passed: bool,
    pub var_threshold: f64,
    pub breaches: Vec<BreachEvent>,
    pub warnings: Vec<String>,
}

/// Count periods where the realized weighted-portfolio loss
/// `-r_p * position_size` exceeds `var_threshold`.
///
/// Passes when the exceedance rate is within two percentage points of
/// `1 - confidence_level` and the Kupiec statistic is below 3.84.
pub fn perform_backtest(
    returns: &[Vec<f64>],
    weights: &[f64],
    var_threshold: f64,
    confidence_level: f64,
    position_size: f64,
) -> RiskResult<BacktestResult> {
    let expected_rate = validate_var_parameters(confidence_level, position_size)?;
    if !var_threshold.is_finite() || var_threshold < 0.0 {
        return Err(RiskError::invalid(
            "var_threshold",
            format!("must be a non-negative loss amount, got {var_threshold}"),
        ));
    }
    let mut warnings = Vec::new();
    let (aligned, w) = prepare_portfolio(returns, weights, &mut warnings)?;
    let realized = weighted_sum(&aligned, &w);
    if realized.is_empty() {
        return Err(RiskError::insufficient("backtest", 1, 0));
    }

    let breaches: Vec<BreachEvent> = realized
        .iter()
        .enumerate()
        .filter_map(|(period, r)| {
            let loss = -r * position_size;
            (loss > var_threshold).then(|| BreachEvent {
                period,
                label: format!("day-{period}"),
                loss,
                threshold: var_threshold,
            })
        })
        .collect();

    let observations = realized.len();
    let exceedances = breaches.len();
    let exceedance_rate = exceedances as f64 / observations as f64;
    let kupiec_statistic = calculate_kupiec_test(exceedances, observations, expected_rate)?;
    let p_value = kupiec_p_value(kupiec_statistic)?;
    let passed = (exceedance_rate - expected_rate).abs() < PASS_RATE_TOLERANCE
        && kupiec_statistic < KUPIEC_CRITICAL_VALUE;

    if passed {
        debug!(
            exceedances,
            observations,
            kupiec_statistic,
            "backtest passed"
        );
    } else {
        warn!(
            exceedances,
            observations,
            kupiec_statistic,
            "VaR model rejected by backtest"
        );
    }

    Ok(BacktestResult {
        exceedances,
        observations,
        exceedance_rate,
        expected_rate,
        kupiec_statistic,
        p_value,
        passed,
        var_threshold,
        breaches,
        warnings,
    })
}

/// In-sample backtest of the parametric portfolio VaR computed from the
/// same returns.
pub fn backtest_parametric_var(
    returns: &[Vec<f64>],
    weights: &[f64],
    confidence_level: f64,
    position_size: f64,
) -> RiskResult<BacktestResult> {
    let var = calculate_portfolio_var(returns, weights, confidence_level, position_size)?;
    let mut result = perform_backtest(
        returns,
        &var.weights,
        var.portfolio.var,
        confidence_level,
        position_size,
    )?;
    let mut warnings = var.warnings;
    warnings.append(&mut result.warnings);
    result.warnings = warnings;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    /// 250 periods with exactly `losses` days of -2%, the rest +0.1%.
    fn series_with_losses(losses: usize) -> Vec<Vec<f64>> {
        let r: Vec<f64> = (0..250)
            .map(|i| if i % 25 == 0 && i / 25 < losses { -0.02 } else { 0.001 })
            .collect();
        vec![r]
    }

    // -----------------------------------------------------------------------
    // 1. Exceedance counting
    // -----------------------------------------------------------------------
    #[test]
    fn test_counts_breaches() {
        let result = perform_backtest(&series_with_losses(5), &[1.0], 0.01, 0.95, 1.0).unwrap();
        assert_eq!(result.exceedances, 5);
        assert_eq!(result.observations, 250);
        assert_abs_diff_eq!(result.exceedance_rate, 0.02, epsilon = 1e-12);
        assert_eq!(result.breaches[1].period, 25);
        assert_eq!(result.breaches[1].label, "day-25");
        assert_abs_diff_eq!(result.breaches[0].loss, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_position_size_scales_losses() {
        let result =
            perform_backtest(&series_with_losses(3), &[1.0], 150.0, 0.95, 10_000.0).unwrap();
        // losses of 200 breach a 150 threshold
        assert_eq!(result.exceedances, 3);
    }

    // -----------------------------------------------------------------------
    // 2. Pass / fail
    // -----------------------------------------------------------------------
    #[test]
    fn test_too_few_breaches_fails() {
        // 0 of 250 at 5%: Kupiec statistic 25.6
        let result = perform_backtest(&series_with_losses(0), &[1.0], 0.01, 0.95, 1.0).unwrap();
        assert!(!result.passed);
        assert!(result.kupiec_statistic > KUPIEC_CRITICAL_VALUE);
    }

    #[test]
    fn test_expected_breaches_pass() {
        // 10 of 250 is 4%, within two points of 5%
        let result = perform_backtest(&series_with_losses(10), &[1.0], 0.01, 0.95, 1.0).unwrap();
        assert!(result.passed);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_in_sample_parametric() {
        let returns: Vec<Vec<f64>> = vec![
            (0..300).map(|i| 0.0005 + 0.012 * ((i as f64) * 0.41).sin()).collect(),
            (0..300).map(|i| 0.0002 + 0.008 * ((i as f64) * 1.7).cos()).collect(),
        ];
        let result = backtest_parametric_var(&returns, &[0.6, 0.4], 0.95, 1.0).unwrap();
        assert_eq!(result.observations, 300);
        assert!(result.var_threshold > 0.0);
    }

    #[test]
    fn test_rejects_negative_threshold() {
        assert!(perform_backtest(&series_with_losses(1), &[1.0], -1.0, 0.95, 1.0).is_err());
    }
}
