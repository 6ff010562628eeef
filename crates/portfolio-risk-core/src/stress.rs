//! Scenario stress tests: uniform additive return shocks applied to every
//! series, with the portfolio VaR recomputed under each shock.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RiskError;
use crate::var::portfolio::calculate_portfolio_var;
use crate::RiskResult;

/// Ratio to the unstressed VaR above which a scenario is severe.
pub const SEVERE_RATIO: f64 = 3.0;
pub const HIGH_RATIO: f64 = 2.0;
pub const MODERATE_RATIO: f64 = 1.5;

/// A named shock added to every periodic return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    /// Additive shock per period, e.g. `-0.05`.
    pub shock: f64,
    /// Subjective probability of the scenario.
    #[serde(default)]
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StressScenario {
    pub fn new(name: impl Into<String>, shock: f64, probability: f64) -> Self {
        Self {
            name: name.into(),
            shock,
            probability,
            description: None,
        }
    }

    fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressResult {
    pub scenario: String,
    pub shock: f64,
    pub probability: f64,
    /// Portfolio VaR under the shocked returns.
    pub stressed_var: f64,
    pub stressed_expected_shortfall: f64,
    /// `stressed_var / base_var`.
    pub loss_ratio: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestReport {
    pub base_var: f64,
    pub confidence_level: f64,
    pub position_size: f64,
    /// Sorted by stressed VaR, largest first.
    pub results: Vec<StressResult>,
    pub worst_scenario: Option<String>,
    /// `sum(probability * stressed_var)`.
    pub probability_weighted_loss: f64,
    pub warnings: Vec<String>,
}

/// Severity by ratio to the unstressed VaR. Thresholds are exclusive:
/// a ratio of exactly 2 is `Moderate`.
pub fn classify_severity(ratio: f64) -> Severity {
    if ratio > SEVERE_RATIO {
        Severity::Severe
    } else if ratio > HIGH_RATIO {
        Severity::High
    } else if ratio > MODERATE_RATIO {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

/// Built-in scenario library.
pub fn default_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario::new("market_crash", -0.10, 0.01)
            .describe("Broad equity sell-off of 10% per period"),
        StressScenario::new("recession", -0.03, 0.05)
            .describe("Sustained earnings contraction"),
        StressScenario::new("interest_rate_shock", -0.02, 0.10)
            .describe("Sharp repricing of discount rates"),
        StressScenario::new("mild_correction", -0.01, 0.20)
            .describe("Ordinary market pullback"),
        StressScenario::new("flash_crash", -0.07, 0.02)
            .describe("Liquidity-driven intraday collapse"),
    ]
}

/// Recompute parametric portfolio VaR under each scenario.
///
/// Results are ordered by stressed VaR, largest first; tied scenarios keep
/// their input order.
pub fn run_stress_tests(
    returns: &[Vec<f64>],
    weights: &[f64],
    scenarios: &[StressScenario],
    confidence_level: f64,
    position_size: f64,
) -> RiskResult<StressTestReport> {
    if scenarios.is_empty() {
        return Err(RiskError::insufficient("stress scenarios", 1, 0));
    }
    if let Some(bad) = scenarios
        .iter()
        .find(|s| !s.shock.is_finite() || !s.probability.is_finite() || s.probability < 0.0)
    {
        return Err(RiskError::invalid(
            "scenarios",
            format!(
                "scenario `{}` needs a finite shock and non-negative probability",
                bad.name
            ),
        ));
    }

    let base = calculate_portfolio_var(returns, weights, confidence_level, position_size)?;
    let base_var = base.portfolio.var;
    let mut warnings = base.warnings.clone();
    if base_var <= 0.0 {
        warnings.push("Unstressed VaR is zero; loss ratios reported as 0".into());
    }

    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let shocked: Vec<Vec<f64>> = returns
            .iter()
            .map(|r| r.iter().map(|x| x + scenario.shock).collect())
            .collect();
        let stressed =
            calculate_portfolio_var(&shocked, &base.weights, confidence_level, position_size)?;
        let stressed_var = stressed.portfolio.var;
        let (loss_ratio, severity) = if base_var > 0.0 {
            let ratio = stressed_var / base_var;
            (ratio, classify_severity(ratio))
        } else if stressed_var > 0.0 {
            (0.0, Severity::Severe)
        } else {
            (0.0, Severity::Low)
        };
        debug!(
            scenario = %scenario.name,
            stressed_var,
            loss_ratio,
            "stress scenario"
        );
        results.push(StressResult {
            scenario: scenario.name.clone(),
            shock: scenario.shock,
            probability: scenario.probability,
            stressed_var,
            stressed_expected_shortfall: stressed.portfolio.expected_shortfall,
            loss_ratio,
            severity,
        });
    }

    results.sort_by(|a, b| {
        b.stressed_var
            .partial_cmp(&a.stressed_var)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let severe = results
        .iter()
        .filter(|r| r.severity == Severity::Severe)
        .count();
    if severe > 0 {
        warn!(severe, "severe stress scenarios");
    }

    Ok(StressTestReport {
        base_var,
        confidence_level,
        position_size,
        worst_scenario: results.first().map(|r| r.scenario.clone()),
        probability_weighted_loss: results.iter().map(|r| r.probability * r.stressed_var).sum(),
        results,
        warnings,
    })
}
