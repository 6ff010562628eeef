use tracing::{debug, warn};

use crate::error::RiskError;
use crate::matrix::{covariance_matrix, dot, mat_vec_multiply};
use crate::series::{align_to_shortest, validate_returns};
use crate::stats::outliers::DEFAULT_OUTLIER_THRESHOLD;
use crate::stats::{mean, outlier_flags, OutlierMethod};
use crate::types::{Matrix, TRADING_DAYS};
use crate::RiskResult;

use super::constraints::{enforce_constraints, equal_weights};
use super::types::{
    MonteCarloConfig, OptimizationConstraints, OptimizationResult, PortfolioMetrics, SolverPath,
    Strategy,
};
use super::validation::validate_weights;

/// Minimum observations per asset before an optimizer can be built.
pub const MIN_OPTIMIZER_OBSERVATIONS: usize = 10;

/// Tolerance on covariance symmetry for precomputed statistics.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Cached annualized statistics for one analysis run.
///
/// Built once from a returns matrix (or precomputed statistics) and read by
/// every strategy. Nothing is mutated after construction, so one optimizer
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct PortfolioOptimizer {
    pub(crate) mean_returns: Vec<f64>,
    pub(crate) covariance: Matrix,
    pub(crate) risk_free_rate: f64,
    pub(crate) constraints: OptimizationConstraints,
    pub(crate) search: MonteCarloConfig,
    observations: usize,
    outliers_removed: Vec<usize>,
}

impl PortfolioOptimizer {
    /// Build with default constraints widened to fit the asset count.
    pub fn new(returns: &[Vec<f64>], risk_free_rate: f64) -> RiskResult<Self> {
        Self::with_constraints(
            returns,
            risk_free_rate,
            OptimizationConstraints::for_assets(returns.len()),
        )
    }

    /// Build from daily returns.
    ///
    /// The series are aligned to the shortest first. Each asset is then scored
    /// with the modified z-score (threshold 3.5) and any period flagged in one
    /// asset is dropped from all of them, so every covariance term pairs
    /// returns from the same date. Means and covariance are annualized with
    /// 252 trading days.
    pub fn with_constraints(
        returns: &[Vec<f64>],
        risk_free_rate: f64,
        constraints: OptimizationConstraints,
    ) -> RiskResult<Self> {
        if returns.is_empty() {
            return Err(RiskError::insufficient("PortfolioOptimizer assets", 1, 0));
        }
        check_risk_free(risk_free_rate)?;
        for series in returns {
            validate_returns(series)?;
            if series.len() < MIN_OPTIMIZER_OBSERVATIONS {
                return Err(RiskError::insufficient(
                    "PortfolioOptimizer",
                    MIN_OPTIMIZER_OBSERVATIONS,
                    series.len(),
                ));
            }
        }
        constraints.check_feasible(returns.len())?;

        let aligned = align_to_shortest(returns);
        let flags: Vec<Vec<bool>> = aligned
            .iter()
            .map(|r| outlier_flags(r, OutlierMethod::ModifiedZScore, DEFAULT_OUTLIER_THRESHOLD))
            .collect();
        let outliers_removed: Vec<usize> = flags
            .iter()
            .map(|f| f.iter().filter(|&&flagged| flagged).count())
            .collect();

        // A period flagged in any asset is dropped from every asset.
        let span = aligned.first().map_or(0, Vec::len);
        let keep: Vec<usize> = (0..span)
            .filter(|&t| flags.iter().all(|f| !f[t]))
            .collect();
        let cleaned: Vec<Vec<f64>> = aligned
            .iter()
            .map(|r| keep.iter().map(|&t| r[t]).collect())
            .collect();

        let observations = keep.len();
        if observations < MIN_OPTIMIZER_OBSERVATIONS {
            return Err(RiskError::insufficient(
                "PortfolioOptimizer after outlier removal",
                MIN_OPTIMIZER_OBSERVATIONS,
                observations,
            ));
        }
        let mean_returns: Vec<f64> = cleaned.iter().map(|r| mean(r) * TRADING_DAYS).collect();
        let covariance: Matrix = covariance_matrix(&cleaned)
            .into_iter()
            .map(|row| row.into_iter().map(|c| c * TRADING_DAYS).collect())
            .collect();

        debug!(
            assets = returns.len(),
            observations,
            removed = outliers_removed.iter().sum::<usize>(),
            "portfolio optimizer statistics cached"
        );

        Ok(Self {
            mean_returns,
            covariance,
            risk_free_rate,
            constraints,
            search: MonteCarloConfig::default(),
            observations,
            outliers_removed,
        })
    }

    /// Build from annualized means and covariance computed elsewhere.
    pub fn from_statistics(
        mean_returns: Vec<f64>,
        covariance: Matrix,
        risk_free_rate: f64,
        constraints: OptimizationConstraints,
    ) -> RiskResult<Self> {
        let n = mean_returns.len();
        if n == 0 {
            return Err(RiskError::insufficient("PortfolioOptimizer assets", 1, 0));
        }
        check_risk_free(risk_free_rate)?;
        if mean_returns.iter().any(|m| !m.is_finite()) {
            return Err(RiskError::invalid("mean_returns", "must be finite"));
        }
        if covariance.len() != n {
            return Err(RiskError::mismatch("covariance rows", n, covariance.len()));
        }
        for (i, row) in covariance.iter().enumerate() {
            if row.len() != n {
                return Err(RiskError::mismatch("covariance columns", n, row.len()));
            }
            if row.iter().any(|c| !c.is_finite()) {
                return Err(RiskError::NumericalInstability(format!(
                    "covariance row {i} contains non-finite entries"
                )));
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if (covariance[i][j] - covariance[j][i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(RiskError::invalid(
                        "covariance",
                        format!(
                            "not symmetric: [{i},{j}]={} != [{j},{i}]={}",
                            covariance[i][j], covariance[j][i]
                        ),
                    ));
                }
            }
        }
        constraints.check_feasible(n)?;

        Ok(Self {
            mean_returns,
            covariance,
            risk_free_rate,
            constraints,
            search: MonteCarloConfig::default(),
            observations: 0,
            outliers_removed: vec![0; n],
        })
    }

    /// Monte-Carlo settings used by searches and fallbacks.
    pub fn with_search_config(mut self, search: MonteCarloConfig) -> Self {
        self.search = search;
        self
    }

    pub fn n_assets(&self) -> usize {
        self.mean_returns.len()
    }

    /// Annualized expected returns.
    pub fn mean_returns(&self) -> &[f64] {
        &self.mean_returns
    }

    /// Annualized covariance.
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn constraints(&self) -> &OptimizationConstraints {
        &self.constraints
    }

    pub fn search_config(&self) -> &MonteCarloConfig {
        &self.search
    }

    /// Aligned observations behind the statistics (0 when precomputed).
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Outliers dropped per asset during construction.
    pub fn outliers_removed(&self) -> &[usize] {
        &self.outliers_removed
    }

    /// Annualized risk and return of `weights`.
    pub fn calculate_portfolio_metrics(&self, weights: &[f64]) -> RiskResult<PortfolioMetrics> {
        if weights.len() != self.n_assets() {
            return Err(RiskError::mismatch(
                "calculate_portfolio_metrics weights",
                self.n_assets(),
                weights.len(),
            ));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(RiskError::invalid("weights", "must be finite"));
        }
        Ok(self.metrics(weights))
    }

    pub(crate) fn metrics(&self, weights: &[f64]) -> PortfolioMetrics {
        let expected_return = dot(weights, &self.mean_returns);
        let variance = dot(weights, &mat_vec_multiply(&self.covariance, weights)).max(0.0);
        let volatility = variance.sqrt();
        let degenerate = volatility <= 0.0;
        let sharpe_ratio = if degenerate {
            0.0
        } else {
            (expected_return - self.risk_free_rate) / volatility
        };
        PortfolioMetrics {
            expected_return,
            variance,
            volatility,
            sharpe_ratio,
            degenerate,
        }
    }

    /// Run the chosen strategy.
    pub fn optimize(&self, strategy: Strategy) -> RiskResult<OptimizationResult> {
        match strategy {
            Strategy::MaxSharpe => self.optimize_max_sharpe(self.search.simulations),
            Strategy::MinRisk => self.optimize_min_risk(),
            Strategy::EqualWeight => Ok(self.optimize_equal_weight()),
            Strategy::RiskParity => self.optimize_risk_parity(),
            Strategy::TargetReturn(target) => self.optimize_for_target_return(target),
            Strategy::TargetVolatility(target) => self.optimize_for_target_volatility(target),
        }
    }

    /// Assemble a result, repairing or replacing weights that fail
    /// validation so callers never see an invalid vector.
    pub(crate) fn finish(
        &self,
        strategy: Strategy,
        solver: SolverPath,
        weights: Vec<f64>,
        mut warnings: Vec<String>,
    ) -> OptimizationResult {
        let n = self.n_assets();
        let (weights, solver) = if validate_weights(&weights, n, &self.constraints).is_valid {
            (weights, solver)
        } else {
            let repaired = enforce_constraints(&weights, &self.constraints);
            if repaired.len() == n && validate_weights(&repaired, n, &self.constraints).is_valid {
                warnings.push("Weights projected back onto the constraint set".into());
                (repaired, solver)
            } else {
                warn!(
                    ?strategy,
                    "optimizer output invalid, falling back to equal weights"
                );
                warnings.push("Optimizer output invalid; equal weights used".into());
                (
                    enforce_constraints(&equal_weights(n), &self.constraints),
                    SolverPath::EqualWeightFallback,
                )
            }
        };

        let m = self.metrics(&weights);
        if m.degenerate {
            warnings.push("Portfolio volatility is zero; Sharpe ratio reported as 0".into());
        }
        let weighted_vol: f64 = weights
            .iter()
            .enumerate()
            .map(|(i, w)| w.abs() * self.covariance[i][i].max(0.0).sqrt())
            .sum();
        let diversification_ratio = if m.volatility > 0.0 {
            weighted_vol / m.volatility
        } else {
            1.0
        };
        let hhi_concentration = weights.iter().map(|w| w * w).sum();
        let constraints_satisfied = validate_weights(&weights, n, &self.constraints).is_valid;

        OptimizationResult {
            strategy,
            solver,
            weights,
            expected_return: m.expected_return,
            volatility: m.volatility,
            sharpe_ratio: m.sharpe_ratio,
            diversification_ratio,
            hhi_concentration,
            constraints_satisfied,
            simulations: None,
            efficient_frontier: None,
            warnings,
        }
    }
}

fn check_risk_free(rate: f64) -> RiskResult<()> {
    if rate.is_finite() {
        Ok(())
    } else {
        Err(RiskError::invalid("risk_free_rate", "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    fn sine_returns(n: usize, amp: f64, drift: f64, phase: f64) -> Vec<f64> {
        (0..n)
            .map(|i| drift + amp * ((i as f64) * 0.7 + phase).sin())
            .collect()
    }

    fn three_assets() -> Vec<Vec<f64>> {
        vec![
            sine_returns(120, 0.010, 0.0005, 0.0),
            sine_returns(120, 0.015, 0.0008, 1.3),
            sine_returns(120, 0.005, 0.0003, 2.1),
        ]
    }

    // -----------------------------------------------------------------------
    // 1. Construction caches annualized statistics
    // -----------------------------------------------------------------------
    #[test]
    fn test_annualized_means() {
        let returns = three_assets();
        let opt = PortfolioOptimizer::new(&returns, 0.02).unwrap();
        assert_eq!(opt.n_assets(), 3);
        assert_abs_diff_eq!(
            opt.mean_returns()[0],
            mean(&returns[0]) * TRADING_DAYS,
            epsilon = 1e-12
        );
        assert!(opt.covariance()[1][1] > opt.covariance()[2][2]);
        assert_eq!(opt.outliers_removed(), &[0, 0, 0]);
    }

    #[test]
    fn test_spike_drops_period_from_every_asset() {
        let a = sine_returns(260, 0.01, 0.0005, 0.0);
        let mut b = a.clone();
        b[200] = 0.5;
        let opt = PortfolioOptimizer::new(&[a.clone(), b], 0.0).unwrap();
        assert_eq!(opt.outliers_removed(), &[0, 1]);
        assert_eq!(opt.observations(), 259);
        let cov = opt.covariance();
        let corr = cov[0][1] / (cov[0][0] * cov[1][1]).sqrt();
        assert!(corr >= 0.99, "correlation {corr}");
        assert_abs_diff_eq!(
            opt.mean_returns()[0],
            opt.mean_returns()[1],
            epsilon = 1e-12
        );
    }

    // -----------------------------------------------------------------------
    // 2. Construction failures
    // -----------------------------------------------------------------------
    #[test]
    fn test_too_few_observations() {
        let short = vec![vec![0.01; 5], vec![0.02; 5]];
        assert!(matches!(
            PortfolioOptimizer::new(&short, 0.02),
            Err(RiskError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_non_finite_returns_rejected() {
        let mut returns = three_assets();
        returns[1][4] = f64::NAN;
        assert!(PortfolioOptimizer::new(&returns, 0.02).is_err());
    }

    #[test]
    fn test_infeasible_constraints_rejected() {
        let tight = OptimizationConstraints {
            max_position_size: 0.2,
            ..Default::default()
        };
        assert!(matches!(
            PortfolioOptimizer::with_constraints(&three_assets(), 0.02, tight),
            Err(RiskError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_default_cap_widened_for_two_assets() {
        let returns = vec![sine_returns(60, 0.01, 0.0, 0.0), sine_returns(60, 0.02, 0.0, 1.0)];
        let opt = PortfolioOptimizer::new(&returns, 0.0).unwrap();
        assert_abs_diff_eq!(opt.constraints().max_position_size, 0.5, epsilon = 1e-12);
    }

    // -----------------------------------------------------------------------
    // 3. Metrics
    // -----------------------------------------------------------------------
    #[test]
    fn test_metrics_from_statistics() {
        let opt = PortfolioOptimizer::from_statistics(
            vec![0.10, 0.06],
            vec![vec![0.04, 0.006], vec![0.006, 0.01]],
            0.02,
            OptimizationConstraints::for_assets(2),
        )
        .unwrap();
        let m = opt.calculate_portfolio_metrics(&[0.5, 0.5]).unwrap();
        assert_abs_diff_eq!(m.expected_return, 0.08, epsilon = 1e-12);
        // 0.25 * (0.04 + 0.01 + 2 * 0.006)
        assert_abs_diff_eq!(m.variance, 0.0155, epsilon = 1e-12);
        assert_abs_diff_eq!(m.sharpe_ratio, 0.06 / 0.0155_f64.sqrt(), epsilon = 1e-12);
        assert!(!m.degenerate);
    }

    #[test]
    fn test_metrics_zero_volatility() {
        let opt = PortfolioOptimizer::from_statistics(
            vec![0.05, 0.05],
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            0.02,
            OptimizationConstraints::for_assets(2),
        )
        .unwrap();
        let m = opt.calculate_portfolio_metrics(&[0.5, 0.5]).unwrap();
        assert_eq!(m.sharpe_ratio, 0.0);
        assert!(m.degenerate);
    }

    #[test]
    fn test_metrics_wrong_length() {
        let opt = PortfolioOptimizer::new(&three_assets(), 0.02).unwrap();
        assert!(matches!(
            opt.calculate_portfolio_metrics(&[0.5, 0.5]),
            Err(RiskError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_asymmetric_covariance_rejected() {
        let err = PortfolioOptimizer::from_statistics(
            vec![0.1, 0.1],
            vec![vec![0.04, 0.01], vec![0.02, 0.04]],
            0.0,
            OptimizationConstraints::for_assets(2),
        );
        assert!(matches!(err, Err(RiskError::InvalidParameter { .. })));
    }

    // -----------------------------------------------------------------------
    // 4. Invalid weights never escape
    // -----------------------------------------------------------------------
    #[test]
    fn test_finish_repairs_weights() {
        let opt = PortfolioOptimizer::new(&three_assets(), 0.02).unwrap();
        let result = opt.finish(
            Strategy::EqualWeight,
            SolverPath::Analytic,
            vec![0.9, 0.05, 0.05],
            Vec::new(),
        );
        assert!(result.constraints_satisfied);
        assert!(result.weights.iter().all(|w| *w <= 0.4 + 1e-9));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_finish_replaces_ragged_weights() {
        let opt = PortfolioOptimizer::new(&three_assets(), 0.02).unwrap();
        let result = opt.finish(
            Strategy::EqualWeight,
            SolverPath::Analytic,
            vec![1.0],
            Vec::new(),
        );
        assert_eq!(result.solver, SolverPath::EqualWeightFallback);
        assert_eq!(result.weights.len(), 3);
        assert!(result.constraints_satisfied);
    }
}
