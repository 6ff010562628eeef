use std::time::Instant;

use clap::Args;
use serde::{Deserialize, Serialize};

use portfolio_risk_core::backtest::{backtest_parametric_var, perform_backtest};
use portfolio_risk_core::capm::calculate_capm_metrics;
use portfolio_risk_core::stress::{default_scenarios, run_stress_tests, StressScenario};

use super::{envelope, read_request, CommandResult, InputArgs};

fn default_confidence_level() -> f64 {
    0.95
}

fn default_position_size() -> f64 {
    1.0
}

fn default_risk_free_rate() -> f64 {
    0.02
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub returns: Vec<Vec<f64>>,
    pub weights: Vec<f64>,
    /// Loss threshold; the in-sample parametric VaR is used when omitted
    #[serde(default)]
    pub var_threshold: Option<f64>,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_position_size")]
    pub position_size: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StressRequest {
    pub returns: Vec<Vec<f64>>,
    pub weights: Vec<f64>,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<StressScenario>,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_position_size")]
    pub position_size: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CapmRequest {
    pub asset_returns: Vec<f64>,
    pub market_returns: Vec<f64>,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

/// Arguments for VaR backtesting
#[derive(Args)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// VaR threshold, overriding the request file
    #[arg(long)]
    pub var_threshold: Option<f64>,
}

/// Arguments for scenario stress testing
#[derive(Args)]
pub struct StressArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for CAPM regression
#[derive(Args)]
pub struct CapmArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Annual risk-free rate, overriding the request file
    #[arg(long)]
    pub risk_free_rate: Option<f64>,
}

pub fn run_backtest(args: BacktestArgs) -> CommandResult {
    let started = Instant::now();
    let request: BacktestRequest = read_request(&args.input, "backtest")?;
    let threshold = args.var_threshold.or(request.var_threshold);
    let result = match threshold {
        Some(t) => perform_backtest(
            &request.returns,
            &request.weights,
            t,
            request.confidence_level,
            request.position_size,
        )?,
        None => backtest_parametric_var(
            &request.returns,
            &request.weights,
            request.confidence_level,
            request.position_size,
        )?,
    };
    let warnings = result.warnings.clone();
    let threshold_source = match threshold {
        Some(_) => "supplied",
        None => "in_sample_parametric",
    };
    let assumptions = serde_json::json!({
        "confidence_level": request.confidence_level,
        "position_size": request.position_size,
        "threshold_source": threshold_source,
    });
    envelope(
        "VaR exceedance backtest with Kupiec test",
        &assumptions,
        warnings,
        started,
        result,
    )
}

pub fn run_stress(args: StressArgs) -> CommandResult {
    let started = Instant::now();
    let request: StressRequest = read_request(&args.input, "stress")?;
    let report = run_stress_tests(
        &request.returns,
        &request.weights,
        &request.scenarios,
        request.confidence_level,
        request.position_size,
    )?;
    let warnings = report.warnings.clone();
    let assumptions = serde_json::json!({
        "confidence_level": request.confidence_level,
        "position_size": request.position_size,
        "scenarios": request.scenarios.len(),
    });
    envelope(
        "Uniform additive shocks with parametric VaR",
        &assumptions,
        warnings,
        started,
        report,
    )
}

pub fn run_capm(args: CapmArgs) -> CommandResult {
    let started = Instant::now();
    let request: CapmRequest = read_request(&args.input, "capm")?;
    let rf = args.risk_free_rate.unwrap_or(request.risk_free_rate);
    let metrics = calculate_capm_metrics(&request.asset_returns, &request.market_returns, rf)?;
    let warnings = metrics.warnings.clone();
    envelope(
        "CAPM OLS regression on excess returns",
        &serde_json::json!({ "risk_free_rate": rf }),
        warnings,
        started,
        metrics,
    )
}
