mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analysis::{BacktestArgs, CapmArgs, StressArgs};
use commands::optimize::{AllocateArgs, FrontierArgs, OptimizeArgs};
use commands::prices::ReturnsArgs;
use commands::var::{KupiecArgs, MonteCarloVarArgs, VarArgs};

/// Portfolio optimization and Value-at-Risk analytics
#[derive(Parser)]
#[command(
    name = "prisk",
    version,
    about = "Portfolio optimization and Value-at-Risk analytics",
    long_about = "A CLI for mean-variance portfolio optimization, parametric, historical \
                  and Monte-Carlo VaR, CAPM regression, VaR backtesting and stress \
                  testing. Requests are JSON or YAML files, or JSON on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize portfolio weights (max Sharpe, min risk, targets, ...)
    Optimize(OptimizeArgs),
    /// Monte-Carlo efficient frontier
    Frontier(FrontierArgs),
    /// Split capital between the tangency portfolio and the risk-free asset
    Allocate(AllocateArgs),
    /// Single-series VaR (parametric or historical)
    Var(VarArgs),
    /// Portfolio VaR with component and marginal decomposition
    PortfolioVar(VarArgs),
    /// Correlated Monte-Carlo portfolio VaR
    MonteCarloVar(MonteCarloVarArgs),
    /// Backtest a VaR threshold against realized portfolio losses
    Backtest(BacktestArgs),
    /// Shock every return series and recompute VaR
    Stress(StressArgs),
    /// CAPM regression against a market series
    Capm(CapmArgs),
    /// Convert price histories to returns with a quality screen
    Returns(ReturnsArgs),
    /// Kupiec likelihood-ratio statistic for an exceedance count
    Kupiec(KupiecArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: commands::CommandResult = match cli.command {
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::Frontier(args) => commands::optimize::run_frontier(args),
        Commands::Allocate(args) => commands::optimize::run_allocate(args),
        Commands::Var(args) => commands::var::run_var(args),
        Commands::PortfolioVar(args) => commands::var::run_portfolio_var(args),
        Commands::MonteCarloVar(args) => commands::var::run_monte_carlo_var(args),
        Commands::Backtest(args) => commands::analysis::run_backtest(args),
        Commands::Stress(args) => commands::analysis::run_stress(args),
        Commands::Capm(args) => commands::analysis::run_capm(args),
        Commands::Returns(args) => commands::prices::run_returns(args),
        Commands::Kupiec(args) => commands::var::run_kupiec(args),
        Commands::Version => {
            println!("prisk {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
