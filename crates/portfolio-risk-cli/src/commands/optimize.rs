use std::time::Instant;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::debug;

use portfolio_risk_core::optimizer::{
    MonteCarloConfig, OptimizationConstraints, PortfolioOptimizer, Strategy,
};

use super::{envelope, read_request, CommandResult, InputArgs};

fn default_risk_free_rate() -> f64 {
    0.02
}

fn default_strategy() -> Strategy {
    Strategy::MaxSharpe
}

/// Returns matrix plus optimizer settings
#[derive(Debug, Serialize, Deserialize)]
pub struct PortfolioRequest {
    /// Daily returns, one series per asset
    pub returns: Vec<Vec<f64>>,
    /// Annual risk-free rate
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Position bounds; widened defaults when omitted
    #[serde(default)]
    pub constraints: Option<OptimizationConstraints>,
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl PortfolioRequest {
    fn build(&self) -> Result<PortfolioOptimizer, Box<dyn std::error::Error>> {
        let optimizer = match self.constraints {
            Some(ref c) => {
                PortfolioOptimizer::with_constraints(&self.returns, self.risk_free_rate, c.clone())?
            }
            None => PortfolioOptimizer::new(&self.returns, self.risk_free_rate)?,
        };
        debug!(
            assets = optimizer.n_assets(),
            observations = optimizer.observations(),
            "optimizer ready"
        );
        Ok(optimizer.with_search_config(self.monte_carlo.clone()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(flatten)]
    pub portfolio: PortfolioRequest,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllocateRequest {
    #[serde(flatten)]
    pub portfolio: PortfolioRequest,
    #[serde(default)]
    pub target_return: Option<f64>,
    #[serde(default)]
    pub target_volatility: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    MaxSharpe,
    MinRisk,
    EqualWeight,
    RiskParity,
}

/// Arguments for portfolio optimization
#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Strategy, overriding the request file
    #[arg(long)]
    pub strategy: Option<StrategyArg>,

    /// Solve for this annual return
    #[arg(long, conflicts_with = "target_volatility")]
    pub target_return: Option<f64>,

    /// Solve for this annual volatility
    #[arg(long)]
    pub target_volatility: Option<f64>,

    /// Seed for Monte-Carlo searches
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for efficient frontier generation
#[derive(Args)]
pub struct FrontierArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of interpolated frontier points
    #[arg(long)]
    pub points: Option<usize>,
}

/// Arguments for capital allocation between tangency and risk-free assets
#[derive(Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long)]
    pub target_return: Option<f64>,

    #[arg(long)]
    pub target_volatility: Option<f64>,
}

pub fn run_optimize(args: OptimizeArgs) -> CommandResult {
    let started = Instant::now();
    let mut request: OptimizeRequest = read_request(&args.input, "optimize")?;
    if args.seed.is_some() {
        request.portfolio.monte_carlo.seed = args.seed;
    }
    let strategy = match (args.target_return, args.target_volatility, args.strategy) {
        (Some(t), _, _) => Strategy::TargetReturn(t),
        (None, Some(v), _) => Strategy::TargetVolatility(v),
        (None, None, Some(StrategyArg::MaxSharpe)) => Strategy::MaxSharpe,
        (None, None, Some(StrategyArg::MinRisk)) => Strategy::MinRisk,
        (None, None, Some(StrategyArg::EqualWeight)) => Strategy::EqualWeight,
        (None, None, Some(StrategyArg::RiskParity)) => Strategy::RiskParity,
        (None, None, None) => request.strategy,
    };

    let optimizer = request.portfolio.build()?;
    let result = optimizer.optimize(strategy)?;
    let warnings = result.warnings.clone();
    let assumptions = serde_json::json!({
        "strategy": strategy,
        "risk_free_rate": optimizer.risk_free_rate(),
        "constraints": optimizer.constraints(),
        "annualization_periods": portfolio_risk_core::TRADING_DAYS,
    });
    envelope(
        "Mean-variance optimization",
        &assumptions,
        warnings,
        started,
        result,
    )
}

pub fn run_frontier(args: FrontierArgs) -> CommandResult {
    let started = Instant::now();
    let request: PortfolioRequest = read_request(&args.input, "frontier")?;
    let optimizer = request.build()?;
    let points = args.points.unwrap_or(request.monte_carlo.frontier_points);
    let frontier =
        optimizer.generate_efficient_frontier(request.monte_carlo.simulations, points)?;
    let assumptions = serde_json::json!({
        "simulations": request.monte_carlo.simulations,
        "points": points,
        "risk_free_rate": optimizer.risk_free_rate(),
    });
    envelope(
        "Monte-Carlo efficient frontier (upper envelope, linear interpolation)",
        &assumptions,
        Vec::new(),
        started,
        frontier,
    )
}

pub fn run_allocate(args: AllocateArgs) -> CommandResult {
    let started = Instant::now();
    let request: AllocateRequest = read_request(&args.input, "allocate")?;
    let target_return = args.target_return.or(request.target_return);
    let target_volatility = args.target_volatility.or(request.target_volatility);
    let optimizer = request.portfolio.build()?;
    let allocation = optimizer.calculate_capital_allocation(target_return, target_volatility)?;
    let warnings = allocation.warnings.clone();
    let assumptions = serde_json::json!({
        "target_return": target_return,
        "target_volatility": target_volatility,
        "risk_free_rate": optimizer.risk_free_rate(),
    });
    envelope(
        "Capital market line allocation",
        &assumptions,
        warnings,
        started,
        allocation,
    )
}
