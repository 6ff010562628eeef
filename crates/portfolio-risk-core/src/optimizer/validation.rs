use super::constraints::BOUND_TOLERANCE;
use super::engine::PortfolioOptimizer;
use super::types::{ConstraintViolation, OptimizationConstraints, ValidationReport, ViolationRule};

/// Tolerance on `sum(w) = 1`.
pub const BUDGET_TOLERANCE: f64 = 1e-6;

impl PortfolioOptimizer {
    /// Check a weight vector against this optimizer's asset count and
    /// constraints.
    pub fn validate_optimization_result(&self, weights: &[f64]) -> ValidationReport {
        validate_weights(weights, self.n_assets(), &self.constraints)
    }
}

/// Structured validation of `weights` for `n` assets.
pub fn validate_weights(
    weights: &[f64],
    n: usize,
    constraints: &OptimizationConstraints,
) -> ValidationReport {
    let mut violations = Vec::new();
    let weight_sum: f64 = weights.iter().sum();

    if weights.len() != n {
        violations.push(ConstraintViolation {
            rule: ViolationRule::DimensionMismatch,
            asset: None,
            detail: format!("expected {n} weights, got {}", weights.len()),
        });
        return ValidationReport {
            is_valid: false,
            weight_sum,
            violations,
        };
    }

    for (i, w) in weights.iter().enumerate() {
        if !w.is_finite() {
            violations.push(ConstraintViolation {
                rule: ViolationRule::NonFinite,
                asset: Some(i),
                detail: format!("weight {i} is {w}"),
            });
        }
    }
    if !violations.is_empty() {
        return ValidationReport {
            is_valid: false,
            weight_sum,
            violations,
        };
    }

    if (weight_sum - 1.0).abs() >= BUDGET_TOLERANCE {
        violations.push(ConstraintViolation {
            rule: ViolationRule::BudgetNotMet,
            asset: None,
            detail: format!("weights sum to {weight_sum:.8}"),
        });
    }

    let upper = constraints.upper_bound();
    let lower = constraints.lower_bound();
    for (i, w) in weights.iter().copied().enumerate() {
        if !constraints.allow_short_selling && w < -BOUND_TOLERANCE {
            violations.push(ConstraintViolation {
                rule: ViolationRule::NegativeWeight,
                asset: Some(i),
                detail: format!("weight {i} is {w:.6} with short selling disabled"),
            });
        } else if w < lower - BOUND_TOLERANCE {
            violations.push(ConstraintViolation {
                rule: ViolationRule::BelowMinPosition,
                asset: Some(i),
                detail: format!("weight {i} is {w:.6}, minimum {lower}"),
            });
        }
        if w > upper + BOUND_TOLERANCE {
            violations.push(ConstraintViolation {
                rule: ViolationRule::AboveMaxPosition,
                asset: Some(i),
                detail: format!("weight {i} is {w:.6}, maximum {upper}"),
            });
        }
    }

    ValidationReport {
        is_valid: violations.is_empty(),
        weight_sum,
        violations,
    }
}
