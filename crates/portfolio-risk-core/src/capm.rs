//! Single-factor CAPM regression of an asset against a market series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RiskError;
use crate::series::{align_to_shortest, validate_returns};
use crate::stats::descriptive::{mean, std_dev};
use crate::types::TRADING_DAYS;
use crate::RiskResult;

/// Minimum aligned observations for the regression.
pub const MIN_CAPM_OBSERVATIONS: usize = 30;

/// Per-period variance below which a series is treated as constant.
const MIN_VARIANCE: f64 = 1e-20;

/// Annualized tracking error treated as zero.
const MIN_TRACKING_ERROR: f64 = 1e-12;

/// Output of [`calculate_capm_metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapmMetrics {
    /// Slope of asset excess returns on market excess returns.
    pub beta: f64,
    /// Regression intercept, annualized.
    pub alpha: f64,
    pub r_squared: f64,
    /// Correlation of the two excess-return series.
    pub correlation: f64,
    /// `rf + beta * (market_return - rf)`.
    pub expected_return: f64,
    /// Annualized mean market return.
    pub market_return: f64,
    /// Annualized standard deviation of the regression residual.
    pub tracking_error: f64,
    /// `alpha / tracking_error`, 0 when tracking error is 0.
    pub information_ratio: f64,
    pub observations: usize,
    pub warnings: Vec<String>,
}

/// OLS of asset excess returns on market excess returns.
///
/// Both series are aligned to their common most recent length and the
/// annual `risk_free_rate` is de-annualized over 252 periods.
pub fn calculate_capm_metrics(
    asset_returns: &[f64],
    market_returns: &[f64],
    risk_free_rate: f64,
) -> RiskResult<CapmMetrics> {
    validate_returns(asset_returns)?;
    validate_returns(market_returns)?;
    if !risk_free_rate.is_finite() {
        return Err(RiskError::invalid("risk_free_rate", "must be finite"));
    }

    let aligned = align_to_shortest(&[asset_returns.to_vec(), market_returns.to_vec()]);
    let (asset, market) = (&aligned[0], &aligned[1]);
    let n = asset.len();
    if n < MIN_CAPM_OBSERVATIONS {
        return Err(RiskError::insufficient("CAPM regression", MIN_CAPM_OBSERVATIONS, n));
    }

    let daily_rf = risk_free_rate / TRADING_DAYS;
    let y: Vec<f64> = asset.iter().map(|r| r - daily_rf).collect();
    let x: Vec<f64> = market.iter().map(|r| r - daily_rf).collect();
    let (x_bar, y_bar) = (mean(&x), mean(&y));

    let sxx: f64 = x.iter().map(|v| (v - x_bar).powi(2)).sum();
    let syy: f64 = y.iter().map(|v| (v - y_bar).powi(2)).sum();
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - x_bar) * (b - y_bar))
        .sum();
    if sxx <= MIN_VARIANCE * n as f64 {
        return Err(RiskError::invalid(
            "market_returns",
            "market series has zero variance",
        ));
    }

    let mut warnings = Vec::new();
    let beta = sxy / sxx;
    let alpha_daily = y_bar - beta * x_bar;
    let residuals: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| b - alpha_daily - beta * a)
        .collect();
    let ss_res: f64 = residuals.iter().map(|e| e * e).sum();

    let (r_squared, correlation) = if syy > MIN_VARIANCE * n as f64 {
        ((1.0 - ss_res / syy).clamp(0.0, 1.0), sxy / (sxx * syy).sqrt())
    } else {
        warnings.push("Asset excess returns are constant; R-squared reported as 0".into());
        (0.0, 0.0)
    };

    let alpha = alpha_daily * TRADING_DAYS;
    let market_return = mean(market) * TRADING_DAYS;
    let tracking_error = std_dev(&residuals) * TRADING_DAYS.sqrt();
    let information_ratio = if tracking_error > MIN_TRACKING_ERROR {
        alpha / tracking_error
    } else {
        warnings.push("Tracking error is zero; information ratio reported as 0".into());
        0.0
    };

    debug!(beta, alpha, r_squared, observations = n, "capm regression");

    Ok(CapmMetrics {
        beta,
        alpha,
        r_squared,
        correlation,
        expected_return: risk_free_rate + beta * (market_return - risk_free_rate),
        market_return,
        tracking_error,
        information_ratio,
        observations: n,
        warnings,
    })
}
