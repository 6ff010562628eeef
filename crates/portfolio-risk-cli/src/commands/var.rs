use std::time::Instant;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use portfolio_risk_core::var::{
    self, calculate_kupiec_test, kupiec_p_value, VarConfig, VarMethod, KUPIEC_CRITICAL_VALUE,
};

use super::{envelope, read_request, CommandResult, InputArgs};

fn default_method() -> VarMethod {
    VarMethod::Parametric
}

/// Single-series VaR request
#[derive(Debug, Serialize, Deserialize)]
pub struct VarRequest {
    pub returns: Vec<f64>,
    #[serde(default = "default_method")]
    pub method: VarMethod,
    #[serde(flatten)]
    pub config: VarConfig,
}

/// Weighted-portfolio VaR request
#[derive(Debug, Serialize, Deserialize)]
pub struct PortfolioVarRequest {
    pub returns: Vec<Vec<f64>>,
    pub weights: Vec<f64>,
    #[serde(default = "default_method")]
    pub method: VarMethod,
    #[serde(flatten)]
    pub config: VarConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Parametric,
    Historical,
}

impl From<MethodArg> for VarMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Parametric => VarMethod::Parametric,
            MethodArg::Historical => VarMethod::Historical,
        }
    }
}

/// Arguments for single-series and portfolio VaR
#[derive(Args)]
pub struct VarArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Estimation method, overriding the request file
    #[arg(long)]
    pub method: Option<MethodArg>,

    /// Confidence level (e.g. 0.99), overriding the request file
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Position size / portfolio value, overriding the request file
    #[arg(long)]
    pub position_size: Option<f64>,
}

/// Arguments for Monte-Carlo portfolio VaR
#[derive(Args)]
pub struct MonteCarloVarArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of simulated scenarios
    #[arg(long)]
    pub simulations: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the Kupiec proportion-of-failures test
#[derive(Args)]
pub struct KupiecArgs {
    /// Observed VaR exceedances
    #[arg(long)]
    pub exceedances: usize,

    /// Total observations in the backtest window
    #[arg(long)]
    pub observations: usize,

    /// Expected exceedance rate (1 - confidence)
    #[arg(long, default_value = "0.05")]
    pub expected_rate: f64,
}

#[derive(Debug, Serialize)]
struct KupiecOutput {
    statistic: f64,
    p_value: f64,
    critical_value: f64,
    rejected: bool,
}

fn apply_overrides(config: &mut VarConfig, method: &mut VarMethod, args: &VarArgs) {
    if let Some(m) = args.method {
        *method = m.into();
    }
    if let Some(c) = args.confidence {
        config.confidence_level = c;
    }
    if let Some(p) = args.position_size {
        config.position_size = p;
    }
}

fn methodology(method: VarMethod) -> &'static str {
    match method {
        VarMethod::Parametric => "Parametric VaR with Cornish-Fisher adjustment",
        VarMethod::Historical => "Historical simulation VaR",
        VarMethod::MonteCarlo => "Correlated Monte-Carlo VaR",
    }
}

pub fn run_var(args: VarArgs) -> CommandResult {
    let started = Instant::now();
    let mut request: VarRequest = read_request(&args.input, "var")?;
    apply_overrides(&mut request.config, &mut request.method, &args);
    let c = &request.config;
    let result = match request.method {
        VarMethod::Historical => {
            var::calculate_individual_historical_var(
                &request.returns,
                c.confidence_level,
                c.position_size,
            )?
        }
        VarMethod::Parametric => {
            var::calculate_individual_parametric_var(
                &request.returns,
                c.confidence_level,
                c.position_size,
            )?
        }
        VarMethod::MonteCarlo => {
            let returns = vec![request.returns.clone()];
            var::calculate_monte_carlo_var_with(&returns, &[1.0], c)?
        }
    };
    let warnings = result.warnings.clone();
    envelope(methodology(request.method), c, warnings, started, result)
}

pub fn run_portfolio_var(args: VarArgs) -> CommandResult {
    let started = Instant::now();
    let mut request: PortfolioVarRequest = read_request(&args.input, "portfolio-var")?;
    apply_overrides(&mut request.config, &mut request.method, &args);
    let c = &request.config;
    let result = match request.method {
        VarMethod::Historical => var::calculate_portfolio_historical_var(
            &request.returns,
            &request.weights,
            c.confidence_level,
            c.position_size,
        )?,
        VarMethod::Parametric => var::calculate_portfolio_var(
            &request.returns,
            &request.weights,
            c.confidence_level,
            c.position_size,
        )?,
        VarMethod::MonteCarlo => {
            return Err("method `monte_carlo` is served by the monte-carlo-var command".into())
        }
    };
    let mut warnings = result.warnings.clone();
    warnings.extend(result.portfolio.warnings.iter().cloned());
    envelope(methodology(request.method), c, warnings, started, result)
}

pub fn run_monte_carlo_var(args: MonteCarloVarArgs) -> CommandResult {
    let started = Instant::now();
    let mut request: PortfolioVarRequest = read_request(&args.input, "monte-carlo-var")?;
    if let Some(n) = args.simulations {
        request.config.simulations = n;
    }
    if args.seed.is_some() {
        request.config.seed = args.seed;
    }
    let result =
        var::calculate_monte_carlo_var_with(&request.returns, &request.weights, &request.config)?;
    let warnings = result.warnings.clone();
    envelope(
        methodology(VarMethod::MonteCarlo),
        &request.config,
        warnings,
        started,
        result,
    )
}

pub fn run_kupiec(args: KupiecArgs) -> CommandResult {
    let started = Instant::now();
    let statistic = calculate_kupiec_test(args.exceedances, args.observations, args.expected_rate)?;
    let output = KupiecOutput {
        statistic,
        p_value: kupiec_p_value(statistic)?,
        critical_value: KUPIEC_CRITICAL_VALUE,
        rejected: statistic >= KUPIEC_CRITICAL_VALUE,
    };
    let assumptions = serde_json::json!({
        "exceedances": args.exceedances,
        "observations": args.observations,
        "expected_rate": args.expected_rate,
    });
    envelope(
        "Kupiec proportion-of-failures likelihood ratio",
        &assumptions,
        Vec::new(),
        started,
        output,
    )
}
