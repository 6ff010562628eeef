//! Return-series preparation: price-to-return conversion, data-quality
//! screening, alignment and weighted aggregation.

use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::RiskResult;

/// Minimum prices for a series to pass the quality screen.
pub const MIN_PRICE_POINTS: usize = 20;

/// A one-period move larger than this (in absolute terms) is "extreme".
pub const EXTREME_MOVE: f64 = 0.5;

/// Maximum share of extreme moves tolerated before a series is rejected.
pub const MAX_EXTREME_MOVE_SHARE: f64 = 0.02;

/// Tolerance on the weight budget for weighted aggregation.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Outcome of [`validate_price_series`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeriesReport {
    pub is_valid: bool,
    pub observations: usize,
    pub extreme_moves: usize,
    pub issues: Vec<String>,
}

/// Screen a price history before it is turned into returns.
pub fn validate_price_series(prices: &[f64]) -> PriceSeriesReport {
    let mut issues = Vec::new();

    if prices.len() < MIN_PRICE_POINTS {
        issues.push(format!(
            "Insufficient data points: {} (minimum {})",
            prices.len(),
            MIN_PRICE_POINTS
        ));
    }
    let invalid = prices.iter().filter(|p| !p.is_finite() || **p <= 0.0).count();
    if invalid > 0 {
        issues.push(format!("{invalid} zero, negative or non-finite prices"));
    }

    let extreme_moves = prices
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1].is_finite())
        .filter(|w| (w[1] / w[0] - 1.0).abs() > EXTREME_MOVE)
        .count();
    let moves = prices.len().saturating_sub(1);
    if moves > 0 && extreme_moves as f64 > moves as f64 * MAX_EXTREME_MOVE_SHARE {
        issues.push(format!(
            "Suspicious data: {extreme_moves} one-period moves above {:.0}%",
            EXTREME_MOVE * 100.0
        ));
    }

    PriceSeriesReport {
        is_valid: issues.is_empty(),
        observations: prices.len(),
        extreme_moves,
        issues,
    }
}

/// Simple periodic returns `p[t] / p[t-1] - 1`.
pub fn simple_returns(prices: &[f64]) -> RiskResult<Vec<f64>> {
    if prices.len() < 2 {
        return Err(RiskError::insufficient("simple_returns", 2, prices.len()));
    }
    if let Some((i, p)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(RiskError::invalid(
            "prices",
            format!("price at index {i} must be positive and finite, got {p}"),
        ));
    }
    Ok(prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
}

/// Reject series containing NaN or infinite values.
pub fn validate_returns(returns: &[f64]) -> RiskResult<()> {
    match returns.iter().position(|r| !r.is_finite()) {
        Some(i) => Err(RiskError::NumericalInstability(format!(
            "return at index {i} is not finite"
        ))),
        None => Ok(()),
    }
}

/// Truncate every series to the common minimum length, keeping the most
/// recent observations.
pub fn align_to_shortest(returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let len = returns.iter().map(Vec::len).min().unwrap_or(0);
    returns
        .iter()
        .map(|r| r[r.len() - len..].to_vec())
        .collect()
}

/// Per-period weighted portfolio returns over the aligned sample.
pub fn portfolio_returns(returns: &[Vec<f64>], weights: &[f64]) -> RiskResult<Vec<f64>> {
    if weights.len() != returns.len() {
        return Err(RiskError::mismatch(
            "portfolio_returns weights",
            returns.len(),
            weights.len(),
        ));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(RiskError::invalid(
            "weights",
            format!("must sum to 1, got {total}"),
        ));
    }
    Ok(weighted_sum(&align_to_shortest(returns), weights))
}

/// `sum_i w_i * r_i[t]` over already aligned series.
pub(crate) fn weighted_sum(aligned: &[Vec<f64>], weights: &[f64]) -> Vec<f64> {
    let len = aligned.first().map_or(0, Vec::len);
    (0..len)
        .map(|t| {
            aligned
                .iter()
                .zip(weights.iter())
                .map(|(r, w)| w * r[t])
                .sum()
        })
        .collect()
}
