//! Portfolio risk analytics: mean-variance optimization, multi-method
//! Value-at-Risk, CAPM regression, VaR backtesting and stress testing.
//!
//! Every computation is synchronous and pure over caller-supplied return
//! arrays. Fatal misuse is reported through [`RiskError`]; recoverable
//! data-quality issues are attached to results as warnings.

pub mod cancel;
pub mod error;
pub mod matrix;
pub mod series;
pub mod stats;
pub mod types;

#[cfg(any(feature = "optimizer", feature = "var"))]
mod simulation;

#[cfg(feature = "var")]
pub mod var;

#[cfg(feature = "optimizer")]
pub mod optimizer;

#[cfg(feature = "capm")]
pub mod capm;

#[cfg(feature = "backtest")]
pub mod backtest;

#[cfg(feature = "stress")]
pub mod stress;

pub use cancel::CancellationToken;
pub use error::RiskError;
pub use types::*;

/// Standard result type for all portfolio-risk operations
pub type RiskResult<T> = Result<T, RiskError>;
