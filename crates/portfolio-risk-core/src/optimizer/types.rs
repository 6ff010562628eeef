use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;

/// Default cap on any single position.
pub const DEFAULT_MAX_POSITION_SIZE: f64 = 0.4;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Position limits applied to every optimized weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConstraints {
    /// Per-asset lower bound (default 0).
    #[serde(default)]
    pub min_position_size: f64,
    /// Per-asset upper bound (default 0.4).
    #[serde(default = "default_max_position_size")]
    pub max_position_size: f64,
    /// When false every weight is additionally floored at 0.
    #[serde(default)]
    pub allow_short_selling: bool,
}

fn default_max_position_size() -> f64 {
    DEFAULT_MAX_POSITION_SIZE
}

impl Default for OptimizationConstraints {
    fn default() -> Self {
        Self {
            min_position_size: 0.0,
            max_position_size: DEFAULT_MAX_POSITION_SIZE,
            allow_short_selling: false,
        }
    }
}

impl OptimizationConstraints {
    /// Defaults widened so that `n` assets can always be fully invested.
    pub fn for_assets(n: usize) -> Self {
        let mut c = Self::default();
        if n > 0 {
            c.max_position_size = c.max_position_size.max(1.0 / n as f64);
        }
        c
    }

    pub fn lower_bound(&self) -> f64 {
        if self.allow_short_selling {
            self.min_position_size
        } else {
            self.min_position_size.max(0.0)
        }
    }

    pub fn upper_bound(&self) -> f64 {
        self.max_position_size
    }
}

/// Monte-Carlo search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Random portfolios drawn per search.
    #[serde(default = "default_simulations")]
    pub simulations: usize,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Keep every simulated portfolio on max-Sharpe results.
    #[serde(default = "default_keep_trace")]
    pub keep_trace: bool,
    /// Points on the interpolated efficient frontier.
    #[serde(default = "default_frontier_points")]
    pub frontier_points: usize,
    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
}

fn default_simulations() -> usize {
    10_000
}

fn default_keep_trace() -> bool {
    true
}

fn default_frontier_points() -> usize {
    50
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: default_simulations(),
            seed: None,
            keep_trace: default_keep_trace(),
            frontier_points: default_frontier_points(),
            cancel: None,
        }
    }
}

/// Optimization objective, chosen explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Strategy {
    /// Monte-Carlo search for the highest Sharpe ratio.
    MaxSharpe,
    /// Closed-form minimum variance with a Monte-Carlo fallback.
    MinRisk,
    /// `1/n` in every asset.
    EqualWeight,
    /// Monte-Carlo search for equal risk contributions.
    RiskParity,
    /// Two-fund mean-variance solution at an annual return.
    TargetReturn(f64),
    /// Bisection along the frontier to an annual volatility.
    TargetVolatility(f64),
}

/// How the returned weights were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverPath {
    Analytic,
    MonteCarloSearch,
    Bisection,
    /// Last resort after every other path failed validation.
    EqualWeightFallback,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Return/risk figures for one weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub expected_return: f64,
    pub variance: f64,
    pub volatility: f64,
    /// Zero when volatility is zero.
    pub sharpe_ratio: f64,
    /// Set when volatility is zero and the Sharpe ratio is undefined.
    pub degenerate: bool,
}

/// One random portfolio from a Monte-Carlo search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPortfolio {
    pub weights: Vec<f64>,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// A point on the interpolated efficient frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    pub volatility: f64,
    pub expected_return: f64,
    pub sharpe_ratio: f64,
}

/// Output of any optimization strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub strategy: Strategy,
    pub solver: SolverPath,
    pub weights: Vec<f64>,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Weighted average asset volatility over portfolio volatility.
    pub diversification_ratio: f64,
    /// Herfindahl-Hirschman index of the weights.
    pub hhi_concentration: f64,
    pub constraints_satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulations: Option<Vec<SimulatedPortfolio>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficient_frontier: Option<Vec<FrontierPoint>>,
    pub warnings: Vec<String>,
}

/// Mix of the tangency portfolio and the risk-free asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalAllocation {
    pub tangency_weights: Vec<f64>,
    pub tangency_return: f64,
    pub tangency_volatility: f64,
    pub tangency_sharpe: f64,
    /// Fraction in the tangency portfolio, in `[0, 5]`.
    pub risky_weight: f64,
    pub risk_free_weight: f64,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// `risky_weight > 1`, i.e. borrowing at the risk-free rate.
    pub leveraged: bool,
    pub warnings: Vec<String>,
}

/// Rule broken by a weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    DimensionMismatch,
    NonFinite,
    BudgetNotMet,
    NegativeWeight,
    AboveMaxPosition,
    BelowMinPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub rule: ViolationRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<usize>,
    pub detail: String,
}

/// Structured outcome of weight validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub weight_sum: f64,
    pub violations: Vec<ConstraintViolation>,
}
