use tracing::{debug, warn};

use crate::error::RiskError;
use crate::matrix::normal::{normal_inverse, normal_pdf};
use crate::series::validate_returns;
use crate::stats::descriptive::{kurtosis, mean, skewness, std_dev};
use crate::stats::outliers::{remove_outliers, OutlierMethod, DEFAULT_OUTLIER_THRESHOLD};
use crate::RiskResult;

use super::types::{VarMethod, VarResult, VarStatistics};

/// Observations required by the parametric method.
pub const MIN_PARAMETRIC_OBSERVATIONS: usize = 30;

/// Observations required by the historical method.
pub const MIN_HISTORICAL_OBSERVATIONS: usize = 50;

/// Cornish-Fisher is discarded at or beyond these moment magnitudes.
const MAX_ABS_SKEW: f64 = 3.0;
const MAX_ABS_EXCESS_KURTOSIS: f64 = 10.0;

/// Above this `|z' - z|` the analytic normal-tail shortfall is replaced by the
/// empirical tail mean.
const SMALL_ADJUSTMENT: f64 = 0.1;

/// Removing more than this share of points is reported on the result.
const HIGH_OUTLIER_SHARE: f64 = 0.05;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Cornish-Fisher adjusted quantile for skewness `s` and raw kurtosis `k`.
pub fn cornish_fisher_z(z: f64, s: f64, k: f64) -> f64 {
    z + (z * z - 1.0) * s / 6.0 + (z.powi(3) - 3.0 * z) * (k - 3.0) / 24.0
        - (2.0 * z.powi(3) - 5.0 * z) * s * s / 36.0
}

/// Parametric VaR with a Cornish-Fisher correction for skew and kurtosis.
///
/// Needs at least 30 observations. The series is cleaned with the modified
/// z-score before moments are estimated.
pub fn calculate_individual_parametric_var(
    returns: &[f64],
    confidence: f64,
    position_size: f64,
) -> RiskResult<VarResult> {
    let alpha = validate_var_parameters(confidence, position_size)?;
    if returns.len() < MIN_PARAMETRIC_OBSERVATIONS {
        return Err(RiskError::insufficient(
            "parametric VaR",
            MIN_PARAMETRIC_OBSERVATIONS,
            returns.len(),
        ));
    }
    validate_returns(returns)?;

    let mut warnings = Vec::new();
    let cleaned = remove_outliers(
        returns,
        OutlierMethod::ModifiedZScore,
        DEFAULT_OUTLIER_THRESHOLD,
    );
    let removed = returns.len() - cleaned.len();
    if removed as f64 > returns.len() as f64 * HIGH_OUTLIER_SHARE {
        warnings.push(format!(
            "High outlier count: {removed} of {} observations removed",
            returns.len()
        ));
    }

    let mu = mean(&cleaned);
    let sigma = std_dev(&cleaned);
    let skew = skewness(&cleaned);
    let kurt = kurtosis(&cleaned);
    let z = normal_inverse(alpha)?;

    let z_adj = if skew.abs() >= MAX_ABS_SKEW || (kurt - 3.0).abs() >= MAX_ABS_EXCESS_KURTOSIS {
        warn!(skew, kurt, "extreme moments, Cornish-Fisher term discarded");
        warnings.push(format!(
            "Extreme moments (skew {skew:.3}, kurtosis {kurt:.3}): Cornish-Fisher adjustment discarded"
        ));
        z
    } else {
        cornish_fisher_z(z, skew, kurt)
    };
    let adjustment = z_adj - z;

    let var = (mu + z_adj * sigma).abs() * position_size;
    let expected_shortfall = if adjustment.abs() < SMALL_ADJUSTMENT {
        (mu - normal_pdf(z) / alpha * sigma).abs() * position_size
    } else {
        tail_mean(&cleaned, alpha).abs() * position_size
    };
    debug!(
        var,
        expected_shortfall,
        adjustment,
        removed,
        "parametric VaR"
    );

    Ok(VarResult {
        var,
        expected_shortfall,
        confidence_level: confidence,
        method: VarMethod::Parametric,
        position_size,
        statistics: VarStatistics {
            mean: mu,
            volatility: sigma,
            skewness: skew,
            kurtosis: kurt,
            z_score: z_adj,
            cornish_fisher_adjustment: adjustment,
            observations: cleaned.len(),
            outliers_removed: removed,
        },
        exceedance_rate: None,
        warnings,
    })
}

/// Historical-simulation VaR from the empirical quantile of the series.
///
/// Needs at least 50 observations. Tail points are the estimate, so no
/// outlier rejection is applied.
pub fn calculate_individual_historical_var(
    returns: &[f64],
    confidence: f64,
    position_size: f64,
) -> RiskResult<VarResult> {
    validate_var_parameters(confidence, position_size)?;
    if returns.len() < MIN_HISTORICAL_OBSERVATIONS {
        return Err(RiskError::insufficient(
            "historical VaR",
            MIN_HISTORICAL_OBSERVATIONS,
            returns.len(),
        ));
    }
    validate_returns(returns)?;
    Ok(empirical_var(
        returns,
        confidence,
        position_size,
        VarMethod::Historical,
    ))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Check confidence and position size; returns the tail probability.
pub(crate) fn validate_var_parameters(confidence: f64, position_size: f64) -> RiskResult<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(RiskError::invalid(
            "confidence_level",
            format!("must lie strictly between 0 and 1, got {confidence}"),
        ));
    }
    if !position_size.is_finite() || position_size <= 0.0 {
        return Err(RiskError::invalid(
            "position_size",
            format!("must be positive and finite, got {position_size}"),
        ));
    }
    Ok(1.0 - confidence)
}

/// Empirical-quantile VaR over any non-empty sample.
pub(crate) fn empirical_var(
    sample: &[f64],
    confidence: f64,
    position_size: f64,
    method: VarMethod,
) -> VarResult {
    let alpha = 1.0 - confidence;
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let idx = ((alpha * n as f64).floor() as usize).min(n.saturating_sub(1));
    let quantile = sorted[idx];

    let tail = &sorted[..=idx];
    let tail_avg = tail.iter().sum::<f64>() / tail.len() as f64;
    let below = sorted.iter().filter(|x| **x < quantile).count();

    let z = normal_inverse(alpha).unwrap_or(0.0);
    VarResult {
        var: quantile.abs() * position_size,
        expected_shortfall: tail_avg.abs() * position_size,
        confidence_level: confidence,
        method,
        position_size,
        statistics: VarStatistics {
            mean: mean(sample),
            volatility: std_dev(sample),
            skewness: skewness(sample),
            kurtosis: kurtosis(sample),
            z_score: z,
            cornish_fisher_adjustment: 0.0,
            observations: n,
            outliers_removed: 0,
        },
        exceedance_rate: Some(below as f64 / n as f64),
        warnings: Vec::new(),
    }
}

/// Mean of the worst `ceil(alpha * n)` observations.
fn tail_mean(sample: &[f64], alpha: f64) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let k = ((alpha * sorted.len() as f64).ceil() as usize).clamp(1, sorted.len().max(1));
    if sorted.is_empty() {
        return 0.0;
    }
    sorted[..k].iter().sum::<f64>() / k as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
