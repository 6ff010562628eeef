//! Value-at-Risk: parametric (Cornish-Fisher), historical and Monte-Carlo
//! estimates for single series and weighted portfolios, with component and
//! marginal decomposition and the Kupiec coverage test.

pub mod individual;
pub mod kupiec;
pub mod monte_carlo;
pub mod portfolio;
pub mod types;

pub use individual::{
    calculate_individual_historical_var, calculate_individual_parametric_var, cornish_fisher_z,
};
pub use kupiec::{calculate_kupiec_test, kupiec_p_value, KUPIEC_CRITICAL_VALUE};
pub use monte_carlo::{calculate_monte_carlo_var, calculate_monte_carlo_var_with};
pub use portfolio::{calculate_portfolio_historical_var, calculate_portfolio_var};
pub use types::*;
