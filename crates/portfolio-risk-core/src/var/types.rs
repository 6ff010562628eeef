use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::types::Matrix;

/// Estimation method behind a VaR figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    Parametric,
    Historical,
    MonteCarlo,
}

/// VaR run configuration as supplied by a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarConfig {
    /// Confidence level in (0, 1), e.g. 0.95.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Position size / portfolio value the VaR is expressed in.
    #[serde(default = "default_position_size")]
    pub position_size: f64,
    /// Monte-Carlo trials.
    #[serde(default = "default_simulations")]
    pub simulations: usize,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_position_size() -> f64 {
    1.0
}

fn default_simulations() -> usize {
    10_000
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            position_size: default_position_size(),
            simulations: default_simulations(),
            seed: None,
            cancel: None,
        }
    }
}

/// Sample diagnostics behind a VaR estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarStatistics {
    pub mean: f64,
    pub volatility: f64,
    pub skewness: f64,
    /// Raw kurtosis (normal = 3).
    pub kurtosis: f64,
    /// Quantile actually used (normal z, or Cornish-Fisher z').
    pub z_score: f64,
    /// `z' - z`; zero when the expansion was not applied.
    pub cornish_fisher_adjustment: f64,
    /// Observations entering the estimate after cleaning.
    pub observations: usize,
    /// Points dropped by outlier rejection.
    pub outliers_removed: usize,
}

/// Value-at-Risk and expected shortfall at one confidence level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarResult {
    /// Loss magnitude (positive) in position-size units.
    pub var: f64,
    /// Mean loss beyond VaR (positive).
    pub expected_shortfall: f64,
    pub confidence_level: f64,
    pub method: VarMethod,
    pub position_size: f64,
    pub statistics: VarStatistics,
    /// Share of observations strictly below the VaR quantile (empirical methods).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceedance_rate: Option<f64>,
    pub warnings: Vec<String>,
}

/// One asset's share of portfolio VaR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRiskContribution {
    pub asset: usize,
    pub weight: f64,
    /// Stand-alone VaR of the asset at `|weight| * position_size`.
    pub individual_var: f64,
    /// dσp / dwᵢ
    pub marginal_volatility: f64,
    /// dVaR / dwᵢ
    pub marginal_var: f64,
    /// wᵢ · dVaR/dwᵢ; components sum to portfolio VaR.
    pub component_var: f64,
    pub pct_of_total: f64,
}

/// Portfolio VaR with its decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioVarResult {
    pub portfolio: VarResult,
    /// Weights actually used (re-normalized if needed).
    pub weights: Vec<f64>,
    pub contributions: Vec<AssetRiskContribution>,
    pub component_var_total: f64,
    /// `max(0, (Σ individual − portfolio) / Σ individual)`
    pub diversification_benefit: f64,
    pub correlation_matrix: Matrix,
    /// Aligned observations per asset.
    pub observations: usize,
    pub warnings: Vec<String>,
}
