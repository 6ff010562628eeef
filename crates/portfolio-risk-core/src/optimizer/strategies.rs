//! Strategy solvers. Each reads the cached statistics and returns a
//! validated [`OptimizationResult`].

use rand::Rng;
use tracing::{debug, warn};

use crate::error::RiskError;
use crate::matrix::{cholesky_solve, dot, mat_vec_multiply, strict_cholesky};
use crate::simulation::run_trials;
use crate::types::Matrix;
use crate::RiskResult;

use super::constraints::{
    enforce_constraints, equal_weights, max_feasible_weights, BOUND_TOLERANCE,
};
use super::engine::PortfolioOptimizer;
use super::frontier::generate_efficient_frontier;
use super::types::{OptimizationResult, SimulatedPortfolio, SolverPath, Strategy};

/// Relative size of `AC - B^2` below which the two-fund system is degenerate.
const DEGENERATE_DETERMINANT: f64 = 1e-10;

const MAX_BISECTION_ITERATIONS: usize = 50;

/// Acceptable distance between achieved and target volatility.
const VOLATILITY_TOLERANCE: f64 = 1e-4;

/// Weights from the active-set solver.
struct ActiveSetSolution {
    weights: Vec<f64>,
    /// Some subproblem had a singular two-fund system and fell back to
    /// minimum variance.
    degenerate: bool,
}

impl PortfolioOptimizer {
    // -----------------------------------------------------------------------
    // Monte-Carlo strategies
    // -----------------------------------------------------------------------

    /// Highest Sharpe ratio among `simulations` random feasible portfolios.
    ///
    /// Ties keep the first portfolio drawn. The full trace (when enabled on
    /// the search config) and the interpolated efficient frontier are
    /// attached to the result.
    pub fn optimize_max_sharpe(&self, simulations: usize) -> RiskResult<OptimizationResult> {
        let trace = self.simulate(simulations)?;
        let frontier = generate_efficient_frontier(
            &trace,
            self.search.frontier_points,
            self.risk_free_rate,
        );

        let mut result = match first_minimum(&trace, |p| -p.sharpe_ratio) {
            Some(i) => self.finish(
                Strategy::MaxSharpe,
                SolverPath::MonteCarloSearch,
                trace[i].weights.clone(),
                Vec::new(),
            ),
            None => self.equal_weight_fallback(
                Strategy::MaxSharpe,
                "No simulated portfolio had a finite Sharpe ratio",
            ),
        };
        result.efficient_frontier = Some(frontier);
        if self.search.keep_trace {
            result.simulations = Some(trace);
        }
        Ok(result)
    }

    /// Minimum variance under the position bounds.
    ///
    /// Solved in closed form with an active set; a singular covariance falls
    /// back to a Monte-Carlo minimum-volatility search.
    pub fn optimize_min_risk(&self) -> RiskResult<OptimizationResult> {
        match self.solve_active_set(None) {
            Ok(solution) => Ok(self.finish(
                Strategy::MinRisk,
                SolverPath::Analytic,
                solution.weights,
                Vec::new(),
            )),
            Err(RiskError::SingularMatrix(reason))
            | Err(RiskError::NumericalInstability(reason)) => {
                warn!(%reason, "closed-form minimum variance failed, searching");
                let note = format!(
                    "Covariance could not be inverted ({reason}); minimum variance found by Monte-Carlo search"
                );
                let trace = self.simulate(self.search.simulations)?;
                Ok(match first_minimum(&trace, |p| p.volatility) {
                    Some(i) => self.finish(
                        Strategy::MinRisk,
                        SolverPath::MonteCarloSearch,
                        trace[i].weights.clone(),
                        vec![note],
                    ),
                    None => self.equal_weight_fallback(Strategy::MinRisk, &note),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// `1/n` in every asset.
    pub fn optimize_equal_weight(&self) -> OptimizationResult {
        let weights = enforce_constraints(&equal_weights(self.n_assets()), &self.constraints);
        self.finish(
            Strategy::EqualWeight,
            SolverPath::Analytic,
            weights,
            Vec::new(),
        )
    }

    /// Random feasible portfolio whose risk contributions
    /// `w_i (Σw)_i / w'Σw` are closest to `1/n` in squared distance.
    pub fn optimize_risk_parity(&self) -> RiskResult<OptimizationResult> {
        let n = self.n_assets();
        let target = 1.0 / n as f64;
        let candidates = run_trials(
            self.search.simulations.max(1),
            self.search.seed,
            self.search.cancel.as_ref(),
            |rng, _| {
                let w = self.random_weights(rng);
                let sigma_w = mat_vec_multiply(&self.covariance, &w);
                let variance = dot(&w, &sigma_w);
                let score = if variance > 0.0 {
                    w.iter()
                        .zip(sigma_w.iter())
                        .map(|(wi, si)| (wi * si / variance - target).powi(2))
                        .sum()
                } else {
                    f64::INFINITY
                };
                (w, score)
            },
        )?;

        let mut best: Option<(usize, f64)> = None;
        for (i, (_, score)) in candidates.iter().enumerate() {
            if score.is_finite() && best.map_or(true, |(_, s)| *score < s) {
                best = Some((i, *score));
            }
        }
        Ok(match best {
            Some((i, score)) => {
                debug!(score, "risk parity search finished");
                self.finish(
                    Strategy::RiskParity,
                    SolverPath::MonteCarloSearch,
                    candidates[i].0.clone(),
                    Vec::new(),
                )
            }
            None => self.equal_weight_fallback(
                Strategy::RiskParity,
                "Portfolio variance is zero for every candidate",
            ),
        })
    }

    // -----------------------------------------------------------------------
    // Frontier targets
    // -----------------------------------------------------------------------

    /// Minimum-variance portfolio earning `target_return` per year.
    ///
    /// Targets outside the feasible return range are answered with the
    /// closest feasible portfolio and a warning.
    pub fn optimize_for_target_return(&self, target_return: f64) -> RiskResult<OptimizationResult> {
        if !target_return.is_finite() {
            return Err(RiskError::invalid("target_return", "must be finite"));
        }
        let strategy = Strategy::TargetReturn(target_return);
        let mut warnings = Vec::new();

        let (lowest, highest) = self.feasible_return_range();
        if target_return > highest + BOUND_TOLERANCE || target_return < lowest - BOUND_TOLERANCE {
            warn!(
                target_return,
                lowest,
                highest,
                "target return outside feasible range"
            );
            warnings.push(format!(
                "Target return {target_return:.4} is outside the feasible range [{lowest:.4}, {highest:.4}]; closest feasible portfolio returned"
            ));
        }

        match self.solve_active_set(Some(target_return)) {
            Ok(solution) => {
                if solution.degenerate {
                    warnings.push(
                        "Expected returns are collinear; minimum-variance weights used".into(),
                    );
                }
                Ok(self.finish(strategy, SolverPath::Analytic, solution.weights, warnings))
            }
            Err(RiskError::SingularMatrix(reason))
            | Err(RiskError::NumericalInstability(reason)) => {
                warnings.push(format!(
                    "Covariance could not be inverted ({reason}); minimum-risk portfolio returned"
                ));
                self.retarget_min_risk(strategy, warnings)
            }
            Err(e) => Err(e),
        }
    }

    /// Efficient portfolio whose annual volatility is `target_volatility`.
    ///
    /// Bisects on the target return between the minimum-variance portfolio
    /// and the highest feasible return. Targets below the minimum or above
    /// the top of the frontier return the nearest end with a warning.
    pub fn optimize_for_target_volatility(
        &self,
        target_volatility: f64,
    ) -> RiskResult<OptimizationResult> {
        if !target_volatility.is_finite() || target_volatility <= 0.0 {
            return Err(RiskError::invalid(
                "target_volatility",
                format!("must be positive, got {target_volatility}"),
            ));
        }
        let strategy = Strategy::TargetVolatility(target_volatility);
        let mut warnings = Vec::new();

        let low = match self.solve_active_set(None) {
            Ok(solution) => solution.weights,
            Err(RiskError::SingularMatrix(reason))
            | Err(RiskError::NumericalInstability(reason)) => {
                warnings.push(format!(
                    "Covariance could not be inverted ({reason}); minimum-risk portfolio returned"
                ));
                return self.retarget_min_risk(strategy, warnings);
            }
            Err(e) => return Err(e),
        };
        let low_metrics = self.metrics(&low);
        if target_volatility <= low_metrics.volatility + VOLATILITY_TOLERANCE {
            if target_volatility < low_metrics.volatility - VOLATILITY_TOLERANCE {
                warnings.push(format!(
                    "Target volatility {target_volatility:.4} is below the minimum achievable {:.4}",
                    low_metrics.volatility
                ));
            }
            return Ok(self.finish(strategy, SolverPath::Analytic, low, warnings));
        }

        let top_return = dot(
            &max_feasible_weights(&self.mean_returns, &self.constraints),
            &self.mean_returns,
        );
        let high = self.solve_active_set(Some(top_return))?.weights;
        let high_metrics = self.metrics(&high);
        if high_metrics.volatility < target_volatility - VOLATILITY_TOLERANCE {
            warn!(
                target_volatility,
                reachable = high_metrics.volatility,
                "target volatility unreachable"
            );
            warnings.push(format!(
                "Target volatility {target_volatility:.4} is unreachable; highest efficient volatility is {:.4}",
                high_metrics.volatility
            ));
            return Ok(self.finish(strategy, SolverPath::Analytic, high, warnings));
        }

        let (mut lo, mut hi) = (low_metrics.expected_return, top_return);
        let mut best_gap = (high_metrics.volatility - target_volatility).abs();
        let mut best = high;
        for iteration in 0..MAX_BISECTION_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let w = self.solve_active_set(Some(mid))?.weights;
            let vol = self.metrics(&w).volatility;
            let gap = (vol - target_volatility).abs();
            if gap < best_gap {
                best_gap = gap;
                best = w;
            }
            if gap < VOLATILITY_TOLERANCE {
                debug!(iteration, vol, "target volatility bisection converged");
                break;
            }
            if vol < target_volatility {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        if best_gap >= VOLATILITY_TOLERANCE {
            warnings.push(format!(
                "Bisection stopped {best_gap:.5} away from the target volatility"
            ));
        }
        Ok(self.finish(strategy, SolverPath::Bisection, best, warnings))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// `[min, max]` expected return over the feasible box.
    pub(crate) fn feasible_return_range(&self) -> (f64, f64) {
        let negated: Vec<f64> = self.mean_returns.iter().map(|m| -m).collect();
        let lowest = dot(
            &max_feasible_weights(&negated, &self.constraints),
            &self.mean_returns,
        );
        let highest = dot(
            &max_feasible_weights(&self.mean_returns, &self.constraints),
            &self.mean_returns,
        );
        (lowest, highest)
    }

    pub(crate) fn simulate(&self, simulations: usize) -> RiskResult<Vec<SimulatedPortfolio>> {
        if simulations == 0 {
            return Err(RiskError::invalid("simulations", "must be at least 1"));
        }
        run_trials(
            simulations,
            self.search.seed,
            self.search.cancel.as_ref(),
            |rng, _| {
                let weights = self.random_weights(rng);
                let m = self.metrics(&weights);
                SimulatedPortfolio {
                    weights,
                    expected_return: m.expected_return,
                    volatility: m.volatility,
                    sharpe_ratio: m.sharpe_ratio,
                }
            },
        )
    }

    /// Uniform draws normalized to sum 1, then projected onto the bounds.
    fn random_weights<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let raw: Vec<f64> = (0..self.n_assets()).map(|_| rng.gen::<f64>()).collect();
        let total: f64 = raw.iter().sum();
        let normalized: Vec<f64> = if total > 0.0 {
            raw.iter().map(|x| x / total).collect()
        } else {
            equal_weights(raw.len())
        };
        enforce_constraints(&normalized, &self.constraints)
    }

    fn equal_weight_fallback(&self, strategy: Strategy, reason: &str) -> OptimizationResult {
        warn!(?strategy, reason, "falling back to equal weights");
        self.finish(
            strategy,
            SolverPath::EqualWeightFallback,
            enforce_constraints(&equal_weights(self.n_assets()), &self.constraints),
            vec![format!("{reason}; equal weights used")],
        )
    }

    fn retarget_min_risk(
        &self,
        strategy: Strategy,
        mut warnings: Vec<String>,
    ) -> RiskResult<OptimizationResult> {
        let mut result = self.optimize_min_risk()?;
        result.strategy = strategy;
        warnings.append(&mut result.warnings);
        result.warnings = warnings;
        Ok(result)
    }

    /// Mean-variance weights with the budget constraint, an optional
    /// return target and the position bounds.
    ///
    /// Solves the equality-constrained problem over the free assets, pins
    /// any weight that breaks a bound to that bound and re-solves for the
    /// rest. At most `n` passes.
    fn solve_active_set(&self, target_return: Option<f64>) -> RiskResult<ActiveSetSolution> {
        let n = self.n_assets();
        let (lower, upper) = (self.constraints.lower_bound(), self.constraints.upper_bound());
        let mut pinned: Vec<Option<f64>> = vec![None; n];
        let mut degenerate = false;

        for _ in 0..=n {
            let free: Vec<usize> = (0..n).filter(|&i| pinned[i].is_none()).collect();
            let mut w: Vec<f64> = pinned.iter().map(|p| p.unwrap_or(0.0)).collect();
            if free.is_empty() {
                break;
            }

            let budget = 1.0 - w.iter().sum::<f64>();
            let free_target =
                target_return.map(|t| t - dot(&w, &self.mean_returns));
            let (free_weights, sub_degenerate) = self.two_fund(&free, budget, free_target)?;
            degenerate |= sub_degenerate;
            for (k, &i) in free.iter().enumerate() {
                w[i] = free_weights[k];
            }

            let mut violated = false;
            for &i in &free {
                if w[i] > upper + BOUND_TOLERANCE {
                    pinned[i] = Some(upper);
                    violated = true;
                } else if w[i] < lower - BOUND_TOLERANCE {
                    pinned[i] = Some(lower);
                    violated = true;
                }
            }
            if !violated {
                return Ok(ActiveSetSolution {
                    weights: w,
                    degenerate,
                });
            }
        }

        let w: Vec<f64> = pinned.iter().map(|p| p.unwrap_or(lower)).collect();
        Ok(ActiveSetSolution {
            weights: enforce_constraints(&w, &self.constraints),
            degenerate,
        })
    }

    /// `w = Σ⁻¹(λ1 + γμ)` over the `free` assets with `1'w = budget` and,
    /// when given, `μ'w = target`. Returns the weights and whether the
    /// determinant `AC - B^2` was degenerate.
    fn two_fund(
        &self,
        free: &[usize],
        budget: f64,
        target: Option<f64>,
    ) -> RiskResult<(Vec<f64>, bool)> {
        if free.len() == 1 {
            return Ok((vec![budget], false));
        }
        let sub: Matrix = free
            .iter()
            .map(|&i| free.iter().map(|&j| self.covariance[i][j]).collect())
            .collect();
        let mu: Vec<f64> = free.iter().map(|&i| self.mean_returns[i]).collect();

        let l = strict_cholesky(&sub)?;
        let x1 = cholesky_solve(&l, &vec![1.0; free.len()])?;
        let a: f64 = x1.iter().sum();
        if a <= 0.0 || !a.is_finite() {
            return Err(RiskError::SingularMatrix(format!(
                "1' inv(cov) 1 = {a} is not positive"
            )));
        }
        let min_variance: Vec<f64> = x1.iter().map(|x| x * budget / a).collect();
        let Some(target) = target else {
            return Ok((min_variance, false));
        };

        let xm = cholesky_solve(&l, &mu)?;
        let b: f64 = xm.iter().sum();
        let c = dot(&mu, &xm);
        let d = a * c - b * b;
        if d.abs() < DEGENERATE_DETERMINANT * (a * c).abs().max(1.0) {
            return Ok((min_variance, true));
        }
        let lambda = (c * budget - b * target) / d;
        let gamma = (a * target - b * budget) / d;
        Ok((
            x1.iter()
                .zip(xm.iter())
                .map(|(p, q)| lambda * p + gamma * q)
                .collect(),
            false,
        ))
    }
}

/// Index of the first element with the smallest finite score.
fn first_minimum<F>(trace: &[SimulatedPortfolio], score: F) -> Option<usize>
where
    F: Fn(&SimulatedPortfolio) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in trace.iter().enumerate() {
        let s = score(p);
        if s.is_finite() && best.map_or(true, |(_, b)| s < b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::optimizer::types::{MonteCarloConfig, OptimizationConstraints};
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    /// 10% / 20% vol and 6% / 10% vol with correlation 0.3, rf 2%.
    fn two_asset(constraints: OptimizationConstraints) -> PortfolioOptimizer {
        let (va, vb, rho) = (0.20, 0.10, 0.3);
        PortfolioOptimizer::from_statistics(
            vec![0.10, 0.06],
            vec![vec![va * va, rho * va * vb], vec![rho * va * vb, vb * vb]],
            0.02,
            constraints,
        )
        .unwrap()
        .with_search_config(MonteCarloConfig {
            simulations: 4_000,
            seed: Some(42),
            ..Default::default()
        })
    }

    fn three_asset() -> PortfolioOptimizer {
        PortfolioOptimizer::from_statistics(
            vec![0.08, 0.12, 0.05],
            vec![
                vec![0.04, 0.006, 0.002],
                vec![0.006, 0.09, 0.003],
                vec![0.002, 0.003, 0.01],
            ],
            0.02,
            OptimizationConstraints {
                max_position_size: 0.6,
                ..Default::default()
            },
        )
        .unwrap()
        .with_search_config(MonteCarloConfig {
            simulations: 5_000,
            seed: Some(7),
            ..Default::default()
        })
    }

    fn unbounded() -> OptimizationConstraints {
        OptimizationConstraints {
            max_position_size: 1.0,
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // 1. Closed-form minimum variance
    // -----------------------------------------------------------------------
    #[test]
    fn test_min_risk_two_asset_closed_form() {
        let opt = two_asset(unbounded());
        let result = opt.optimize_min_risk().unwrap();
        // w_a = (s_b^2 - cov) / (s_a^2 + s_b^2 - 2 cov)
        let cov = 0.3 * 0.2 * 0.1;
        let expected = (0.01 - cov) / (0.04 + 0.01 - 2.0 * cov);
        assert_abs_diff_eq!(result.weights[0], expected, epsilon = 1e-9);
        assert_eq!(result.solver, SolverPath::Analytic);
        assert!(result.constraints_satisfied);
    }

    #[test]
    fn test_min_risk_respects_cap() {
        let opt = two_asset(OptimizationConstraints {
            max_position_size: 0.8,
            ..Default::default()
        });
        let result = opt.optimize_min_risk().unwrap();
        // unconstrained B weight is ~0.895
        assert_abs_diff_eq!(result.weights[1], 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(result.weights[0], 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_min_risk_singular_falls_back_to_search() {
        let opt = PortfolioOptimizer::from_statistics(
            vec![0.1, 0.1],
            vec![vec![0.04, 0.04], vec![0.04, 0.04]],
            0.0,
            OptimizationConstraints::for_assets(2),
        )
        .unwrap()
        .with_search_config(MonteCarloConfig {
            simulations: 500,
            seed: Some(1),
            ..Default::default()
        });
        let result = opt.optimize_min_risk().unwrap();
        assert_eq!(result.solver, SolverPath::MonteCarloSearch);
        assert!(result.constraints_satisfied);
        assert!(!result.warnings.is_empty());
    }

    // -----------------------------------------------------------------------
    // 2. Target return
    // -----------------------------------------------------------------------
    #[test]
    fn test_target_return_hits_target() {
        let opt = three_asset();
        let result = opt.optimize_for_target_return(0.09).unwrap();
        assert_abs_diff_eq!(result.expected_return, 0.09, epsilon = 1e-9);
        assert!(result.constraints_satisfied);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_target_return_above_range_warns() {
        let opt = three_asset();
        let (_, highest) = opt.feasible_return_range();
        let result = opt.optimize_for_target_return(0.50).unwrap();
        assert!(result.constraints_satisfied);
        assert!(result.expected_return <= highest + 1e-9);
        assert!(result.warnings.iter().any(|w| w.contains("outside")));
    }

    #[test]
    fn test_target_return_rejects_nan() {
        assert!(three_asset().optimize_for_target_return(f64::NAN).is_err());
    }

    // -----------------------------------------------------------------------
    // 3. Target volatility
    // -----------------------------------------------------------------------
    #[test]
    fn test_target_volatility_bisection() {
        let opt = three_asset();
        let result = opt.optimize_for_target_volatility(0.15).unwrap();
        assert_abs_diff_eq!(result.volatility, 0.15, epsilon = VOLATILITY_TOLERANCE);
        assert_eq!(result.solver, SolverPath::Bisection);
        assert!(result.constraints_satisfied);
    }

    #[test]
    fn test_target_volatility_unreachable() {
        let opt = three_asset();
        let result = opt.optimize_for_target_volatility(0.90).unwrap();
        assert!(result.volatility < 0.90);
        assert!(result.warnings.iter().any(|w| w.contains("unreachable")));
    }

    #[test]
    fn test_target_volatility_below_minimum() {
        let opt = three_asset();
        let min_risk = opt.optimize_min_risk().unwrap();
        let result = opt.optimize_for_target_volatility(0.001).unwrap();
        assert_abs_diff_eq!(result.volatility, min_risk.volatility, epsilon = 1e-9);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_target_volatility_rejects_non_positive() {
        assert!(matches!(
            three_asset().optimize_for_target_volatility(0.0),
            Err(RiskError::InvalidParameter { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 4. Monte-Carlo searches
    // -----------------------------------------------------------------------
    #[test]
    fn test_max_sharpe_beats_equal_weight() {
        let opt = three_asset();
        let best = opt.optimize_max_sharpe(5_000).unwrap();
        let equal = opt.optimize_equal_weight();
        assert!(best.sharpe_ratio >= equal.sharpe_ratio);
        assert!(best.constraints_satisfied);
        assert_eq!(best.simulations.as_ref().map(Vec::len), Some(5_000));
        assert!(best.efficient_frontier.is_some());
    }

    #[test]
    fn test_max_sharpe_is_reproducible() {
        let opt = three_asset();
        let a = opt.optimize_max_sharpe(3_000).unwrap();
        let b = opt.optimize_max_sharpe(3_000).unwrap();
        assert_eq!(a.weights, b.weights);
    }

    #[test]
    fn test_max_sharpe_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let opt = three_asset().with_search_config(MonteCarloConfig {
            cancel: Some(token),
            ..Default::default()
        });
        assert!(matches!(opt.optimize_max_sharpe(2_000), Err(RiskError::Cancelled)));
    }

    #[test]
    fn test_max_sharpe_rejects_zero_simulations() {
        assert!(three_asset().optimize_max_sharpe(0).is_err());
    }

    #[test]
    fn test_risk_parity_spreads_risk() {
        let opt = three_asset();
        let result = opt.optimize_risk_parity().unwrap();
        assert!(result.constraints_satisfied);
        // the low-vol asset needs the largest weight
        assert!(result.weights[2] > result.weights[0]);
        assert!(result.weights[2] > result.weights[1]);
    }

    #[test]
    fn test_equal_weight() {
        let result = three_asset().optimize_equal_weight();
        for w in &result.weights {
            assert_abs_diff_eq!(*w, 1.0 / 3.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(result.hhi_concentration, 1.0 / 3.0, epsilon = 1e-12);
        assert!(result.diversification_ratio >= 1.0);
    }

    #[test]
    fn test_optimize_dispatch() {
        let opt = three_asset();
        let result = opt.optimize(Strategy::TargetReturn(0.09)).unwrap();
        assert_eq!(result.strategy, Strategy::TargetReturn(0.09));
    }
}
