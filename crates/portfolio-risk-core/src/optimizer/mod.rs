//! Mean-variance portfolio optimization.
//!
//! A [`PortfolioOptimizer`] is built once per analysis run from a returns
//! matrix; it caches annualized means and covariance and answers every
//! [`Strategy`] from that immutable snapshot.

pub mod allocation;
pub mod constraints;
pub mod engine;
pub mod frontier;
pub mod strategies;
pub mod types;
pub mod validation;

pub use constraints::enforce_constraints;
pub use engine::PortfolioOptimizer;
pub use frontier::generate_efficient_frontier;
pub use types::*;
