use tracing::debug;

use crate::error::RiskError;
use crate::matrix::linalg::cholesky_decomposition;
use crate::matrix::normal::box_muller_random;
use crate::simulation::run_trials;
use crate::stats::correlation::calculate_robust_correlation_matrix;
use crate::stats::descriptive::{mean, std_dev};
use crate::RiskResult;

use super::individual::{empirical_var, validate_var_parameters, MIN_PARAMETRIC_OBSERVATIONS};
use super::portfolio::prepare_portfolio;
use super::types::{VarConfig, VarMethod, VarResult};

/// Fewest trials accepted for a Monte-Carlo VaR run.
pub const MIN_SIMULATIONS: usize = 100;

/// Correlated Monte-Carlo VaR with an entropy-seeded RNG.
pub fn calculate_monte_carlo_var(
    returns: &[Vec<f64>],
    weights: &[f64],
    confidence: f64,
    simulations: usize,
    position_size: f64,
) -> RiskResult<VarResult> {
    let config = VarConfig {
        confidence_level: confidence,
        position_size,
        simulations,
        ..VarConfig::default()
    };
    calculate_monte_carlo_var_with(returns, weights, &config)
}

/// Correlated Monte-Carlo VaR.
///
/// Per-asset normal marginals are fitted to the aligned sample and joined
/// through the Cholesky factor of the robust correlation matrix. The
/// simulated portfolio returns are then read off empirically.
pub fn calculate_monte_carlo_var_with(
    returns: &[Vec<f64>],
    weights: &[f64],
    config: &VarConfig,
) -> RiskResult<VarResult> {
    validate_var_parameters(config.confidence_level, config.position_size)?;
    if config.simulations < MIN_SIMULATIONS {
        return Err(RiskError::invalid(
            "simulations",
            format!(
                "must be at least {MIN_SIMULATIONS}, got {}",
                config.simulations
            ),
        ));
    }

    let mut warnings = Vec::new();
    let (aligned, w) = prepare_portfolio(returns, weights, &mut warnings)?;
    let observations = aligned.first().map_or(0, Vec::len);
    if observations < MIN_PARAMETRIC_OBSERVATIONS {
        return Err(RiskError::insufficient(
            "Monte-Carlo VaR (aligned series)",
            MIN_PARAMETRIC_OBSERVATIONS,
            observations,
        ));
    }

    let means: Vec<f64> = aligned.iter().map(|r| mean(r)).collect();
    let vols: Vec<f64> = aligned.iter().map(|r| std_dev(r)).collect();
    let corr = calculate_robust_correlation_matrix(&aligned);
    let chol = cholesky_decomposition(&corr)?;
    let n = w.len();
    debug!(
        assets = n,
        simulations = config.simulations,
        "monte carlo VaR"
    );

    let simulated = run_trials(
        config.simulations,
        config.seed,
        config.cancel.as_ref(),
        |rng, _| {
            let z: Vec<f64> = (0..n).map(|_| box_muller_random(rng)).collect();
            (0..n)
                .map(|i| {
                    let shock: f64 = (0..=i).map(|k| chol[i][k] * z[k]).sum();
                    w[i] * (means[i] + shock * vols[i])
                })
                .sum::<f64>()
        },
    )?;

    let mut result = empirical_var(
        &simulated,
        config.confidence_level,
        config.position_size,
        VarMethod::MonteCarlo,
    );
    result.warnings = warnings;
    Ok(result)
}
