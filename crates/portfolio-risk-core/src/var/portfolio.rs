use tracing::warn;

use crate::error::RiskError;
use crate::matrix::linalg::{correlation_to_covariance, dot, mat_vec_multiply};
use crate::series::{align_to_shortest, validate_returns, weighted_sum};
use crate::stats::correlation::calculate_robust_correlation_matrix;
use crate::stats::descriptive::std_dev;
use crate::RiskResult;

use super::individual::{
    calculate_individual_historical_var, calculate_individual_parametric_var,
    validate_var_parameters, MIN_HISTORICAL_OBSERVATIONS, MIN_PARAMETRIC_OBSERVATIONS,
};
use super::types::{AssetRiskContribution, PortfolioVarResult, VarMethod, VarResult};

/// Weights are re-normalized when their sum is further than this from 1.
pub const WEIGHT_RENORMALIZE_TOLERANCE: f64 = 0.01;

/// Relative gap between summed components and total VaR that is logged.
const COMPONENT_DISCREPANCY_LIMIT: f64 = 0.10;

/// Parametric (Cornish-Fisher) portfolio VaR with component, marginal and
/// diversification analysis.
pub fn calculate_portfolio_var(
    returns: &[Vec<f64>],
    weights: &[f64],
    confidence: f64,
    position_size: f64,
) -> RiskResult<PortfolioVarResult> {
    portfolio_var(
        returns,
        weights,
        confidence,
        position_size,
        VarMethod::Parametric,
    )
}

/// Historical-simulation portfolio VaR with the same decomposition.
pub fn calculate_portfolio_historical_var(
    returns: &[Vec<f64>],
    weights: &[f64],
    confidence: f64,
    position_size: f64,
) -> RiskResult<PortfolioVarResult> {
    portfolio_var(
        returns,
        weights,
        confidence,
        position_size,
        VarMethod::Historical,
    )
}

fn portfolio_var(
    returns: &[Vec<f64>],
    weights: &[f64],
    confidence: f64,
    position_size: f64,
    method: VarMethod,
) -> RiskResult<PortfolioVarResult> {
    validate_var_parameters(confidence, position_size)?;
    let mut warnings = Vec::new();
    let (aligned, w) = prepare_portfolio(returns, weights, &mut warnings)?;

    let required = match method {
        VarMethod::Historical => MIN_HISTORICAL_OBSERVATIONS,
        _ => MIN_PARAMETRIC_OBSERVATIONS,
    };
    let observations = aligned.first().map_or(0, Vec::len);
    if observations < required {
        return Err(RiskError::insufficient(
            "portfolio VaR (aligned series)",
            required,
            observations,
        ));
    }

    let single = |series: &[f64], size: f64| -> RiskResult<VarResult> {
        match method {
            VarMethod::Historical => calculate_individual_historical_var(series, confidence, size),
            _ => calculate_individual_parametric_var(series, confidence, size),
        }
    };

    let portfolio_series = weighted_sum(&aligned, &w);
    let portfolio = single(&portfolio_series, position_size)?;
    warnings.extend(portfolio.warnings.iter().cloned());

    // --- Decomposition on the regularized covariance ---
    let correlation_matrix = calculate_robust_correlation_matrix(&aligned);
    let vols: Vec<f64> = aligned.iter().map(|r| std_dev(r)).collect();
    let cov = correlation_to_covariance(&correlation_matrix, &vols);
    let sigma_w = mat_vec_multiply(&cov, &w);
    let model_vol = dot(&w, &sigma_w).max(0.0).sqrt();

    let mut contributions = Vec::with_capacity(w.len());
    for (i, series) in aligned.iter().enumerate() {
        let individual_var = if w[i] == 0.0 {
            0.0
        } else {
            single(series, w[i].abs() * position_size)?.var
        };
        let (marginal_volatility, marginal_var) = if model_vol > 0.0 {
            let mv = sigma_w[i] / model_vol;
            (mv, mv * portfolio.var / model_vol)
        } else {
            (0.0, 0.0)
        };
        contributions.push(AssetRiskContribution {
            asset: i,
            weight: w[i],
            individual_var,
            marginal_volatility,
            marginal_var,
            component_var: w[i] * marginal_var,
            pct_of_total: 0.0,
        });
    }
    if model_vol <= 0.0 {
        warnings.push("Zero portfolio volatility: component VaR not decomposed".into());
    }

    let component_var_total: f64 = contributions.iter().map(|c| c.component_var).sum();
    if portfolio.var > 0.0 {
        for c in &mut contributions {
            c.pct_of_total = c.component_var / portfolio.var;
        }
        let gap = (component_var_total - portfolio.var).abs() / portfolio.var;
        if model_vol > 0.0 && gap > COMPONENT_DISCREPANCY_LIMIT {
            warn!(
                component_var_total,
                portfolio_var = portfolio.var,
                "component VaR does not reconcile with total"
            );
            warnings.push(format!(
                "Component VaR sum {component_var_total:.6} differs from total {:.6} by {:.1}%",
                portfolio.var,
                gap * 100.0
            ));
        }
    }

    let individual_total: f64 = contributions.iter().map(|c| c.individual_var).sum();
    let diversification_benefit = if individual_total > 0.0 {
        ((individual_total - portfolio.var) / individual_total).max(0.0)
    } else {
        0.0
    };

    Ok(PortfolioVarResult {
        portfolio,
        weights: w,
        contributions,
        component_var_total,
        diversification_benefit,
        correlation_matrix,
        observations,
        warnings,
    })
}

/// Validate and align a returns matrix against its weights.
///
/// Returns the aligned series together with weights re-normalized when
/// their sum is off by more than 1%.
pub(crate) fn prepare_portfolio(
    returns: &[Vec<f64>],
    weights: &[f64],
    warnings: &mut Vec<String>,
) -> RiskResult<(Vec<Vec<f64>>, Vec<f64>)> {
    if returns.is_empty() {
        return Err(RiskError::insufficient("portfolio assets", 1, 0));
    }
    if weights.len() != returns.len() {
        return Err(RiskError::mismatch("weights", returns.len(), weights.len()));
    }
    for series in returns {
        validate_returns(series)?;
    }
    let w = normalize_weights(weights, warnings)?;
    Ok((align_to_shortest(returns), w))
}

/// Re-normalize weights to sum 1 when they drift by more than 1%.
pub(crate) fn normalize_weights(
    weights: &[f64],
    warnings: &mut Vec<String>,
) -> RiskResult<Vec<f64>> {
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(RiskError::NumericalInstability(
            "weights contain NaN or infinite values".into(),
        ));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() <= WEIGHT_RENORMALIZE_TOLERANCE {
        return Ok(weights.to_vec());
    }
    if total.abs() < f64::EPSILON {
        return Err(RiskError::invalid("weights", "sum to zero and cannot be normalized"));
    }
    warnings.push(format!("Weights summed to {total:.4}; re-normalized to 1"));
    Ok(weights.iter().map(|w| w / total).collect())
}
