//! Box constraints on weights: feasibility, projection and the greedy
//! return bound used by the volatility-target search.

use crate::error::RiskError;
use crate::RiskResult;

use super::types::OptimizationConstraints;

/// Slack allowed when comparing a weight with its bounds.
pub(crate) const BOUND_TOLERANCE: f64 = 1e-9;

/// Passes of the redistribution step in [`enforce_constraints`].
const MAX_REDISTRIBUTION_PASSES: usize = 8;

impl OptimizationConstraints {
    /// Reject bounds that no fully invested portfolio of `n` assets meets.
    pub(crate) fn check_feasible(&self, n: usize) -> RiskResult<()> {
        let (lower, upper) = (self.lower_bound(), self.upper_bound());
        if !lower.is_finite() || !upper.is_finite() {
            return Err(RiskError::invalid(
                "constraints",
                "position bounds must be finite",
            ));
        }
        if lower > upper {
            return Err(RiskError::invalid(
                "constraints",
                format!("min_position_size {lower} exceeds max_position_size {upper}"),
            ));
        }
        let n = n as f64;
        if n * lower > 1.0 + BOUND_TOLERANCE || n * upper < 1.0 - BOUND_TOLERANCE {
            return Err(RiskError::invalid(
                "constraints",
                format!(
                    "bounds [{lower}, {upper}] cannot hold {n} weights summing to 1"
                ),
            ));
        }
        Ok(())
    }
}

/// Project `weights` onto `{ lower <= w_i <= upper, sum w = 1 }`.
///
/// Weights are clipped and renormalized. If renormalizing pushes a weight
/// back outside its bounds, the remaining budget gap is spread in
/// proportion to each weight's room to its bound. Non-finite inputs are
/// treated as sitting on the lower bound.
pub fn enforce_constraints(weights: &[f64], constraints: &OptimizationConstraints) -> Vec<f64> {
    let (lower, upper) = (constraints.lower_bound(), constraints.upper_bound());
    let mut w: Vec<f64> = weights
        .iter()
        .map(|x| if x.is_finite() { x.clamp(lower, upper) } else { lower })
        .collect();
    if w.is_empty() {
        return w;
    }

    let total: f64 = w.iter().sum();
    if total > 0.0 {
        let scaled: Vec<f64> = w.iter().map(|x| x / total).collect();
        if scaled
            .iter()
            .all(|x| *x >= lower - BOUND_TOLERANCE && *x <= upper + BOUND_TOLERANCE)
        {
            return scaled;
        }
    }

    for _ in 0..MAX_REDISTRIBUTION_PASSES {
        let gap = 1.0 - w.iter().sum::<f64>();
        if gap.abs() <= 1e-12 {
            break;
        }
        let room: Vec<f64> = if gap > 0.0 {
            w.iter().map(|x| upper - x).collect()
        } else {
            w.iter().map(|x| x - lower).collect()
        };
        let total_room: f64 = room.iter().sum();
        if total_room <= 0.0 {
            break;
        }
        for (x, r) in w.iter_mut().zip(room.iter()) {
            *x = (*x + gap * r / total_room).clamp(lower, upper);
        }
    }
    w
}

/// Highest expected return reachable under the bounds: every weight starts
/// at `lower` and the remaining budget goes to the best assets first.
pub(crate) fn max_feasible_weights(
    mean_returns: &[f64],
    constraints: &OptimizationConstraints,
) -> Vec<f64> {
    let (lower, upper) = (constraints.lower_bound(), constraints.upper_bound());
    let n = mean_returns.len();
    let mut w = vec![lower; n];
    let mut remaining = 1.0 - lower * n as f64;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| mean_returns[*b].total_cmp(&mean_returns[*a]));
    for i in order {
        if remaining <= 0.0 {
            break;
        }
        let add = (upper - lower).min(remaining);
        w[i] += add;
        remaining -= add;
    }
    w
}

pub(crate) fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn capped(max: f64) -> OptimizationConstraints {
        OptimizationConstraints {
            max_position_size: max,
            ..Default::default()
        }
    }

    fn assert_valid(w: &[f64], c: &OptimizationConstraints) {
        assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        for x in w {
            assert!(*x >= c.lower_bound() - 1e-9 && *x <= c.upper_bound() + 1e-9);
        }
    }

    // -----------------------------------------------------------------------
    // 1. Plain renormalization when it stays inside the box
    // -----------------------------------------------------------------------
    #[test]
    fn test_renormalizes_within_bounds() {
        let c = capped(0.5);
        let w = enforce_constraints(&[0.2, 0.3, 0.3], &c);
        assert_abs_diff_eq!(w[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(w[1], 0.375, epsilon = 1e-12);
        assert_valid(&w, &c);
    }

    // -----------------------------------------------------------------------
    // 2. Excess from a capped weight goes to the others
    // -----------------------------------------------------------------------
    #[test]
    fn test_redistributes_over_cap() {
        let c = capped(0.4);
        let w = enforce_constraints(&[0.9, 0.05, 0.05], &c);
        assert_abs_diff_eq!(w[0], 0.4, epsilon = 1e-9);
        assert_abs_diff_eq!(w[1], 0.3, epsilon = 1e-9);
        assert_valid(&w, &c);
    }

    // -----------------------------------------------------------------------
    // 3. Negatives floored when shorting is off
    // -----------------------------------------------------------------------
    #[test]
    fn test_long_only_floor() {
        let c = capped(1.0);
        let w = enforce_constraints(&[-0.5, 1.0, 0.5], &c);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_valid(&w, &c);
    }

    // -----------------------------------------------------------------------
    // 4. NaN input still yields a valid vector
    // -----------------------------------------------------------------------
    #[test]
    fn test_non_finite_input() {
        let c = capped(0.5);
        let w = enforce_constraints(&[f64::NAN, 0.0, 0.0], &c);
        assert_valid(&w, &c);
    }

    #[test]
    fn test_infeasible_bounds_rejected() {
        assert!(capped(0.3).check_feasible(3).is_err());
        assert!(capped(0.4).check_feasible(3).is_ok());
        let min_too_high = OptimizationConstraints {
            min_position_size: 0.5,
            max_position_size: 0.6,
            allow_short_selling: false,
        };
        assert!(min_too_high.check_feasible(3).is_err());
    }

    #[test]
    fn test_max_feasible_weights_greedy() {
        let w = max_feasible_weights(&[0.05, 0.20, 0.10], &capped(0.4));
        assert_abs_diff_eq!(w[1], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(w[2], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(w[0], 0.2, epsilon = 1e-12);
    }
}
