use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::RiskError;
use crate::RiskResult;

/// 95% critical value of χ²(1).
pub const KUPIEC_CRITICAL_VALUE: f64 = 3.84;

/// Kupiec proportion-of-failures likelihood-ratio statistic.
///
/// `LR = -2 ln[(1-p)^(n-x) p^x] + 2 ln[(1-x/n)^(n-x) (x/n)^x]`, with the
/// closed forms `-2n ln(1-p)` at `x = 0` and `-2n ln(p)` at `x = n`.
pub fn calculate_kupiec_test(
    exceedances: usize,
    total_observations: usize,
    expected_rate: f64,
) -> RiskResult<f64> {
    if total_observations == 0 {
        return Err(RiskError::insufficient("Kupiec test", 1, 0));
    }
    if exceedances > total_observations {
        return Err(RiskError::invalid(
            "exceedances",
            format!("{exceedances} exceeds total observations {total_observations}"),
        ));
    }
    if !(expected_rate > 0.0 && expected_rate < 1.0) {
        return Err(RiskError::invalid(
            "expected_rate",
            format!("must lie strictly between 0 and 1, got {expected_rate}"),
        ));
    }

    let n = total_observations as f64;
    let x = exceedances as f64;
    let p = expected_rate;

    if exceedances == 0 {
        return Ok(-2.0 * n * (1.0 - p).ln());
    }
    if exceedances == total_observations {
        return Ok(-2.0 * n * p.ln());
    }

    let observed = x / n;
    let ln_null = (n - x) * (1.0 - p).ln() + x * p.ln();
    let ln_alt = (n - x) * (1.0 - observed).ln() + x * observed.ln();
    Ok((-2.0 * (ln_null - ln_alt)).max(0.0))
}

/// Upper-tail probability of a Kupiec statistic under χ²(1).
pub fn kupiec_p_value(statistic: f64) -> RiskResult<f64> {
    let chi = ChiSquared::new(1.0)
        .map_err(|e| RiskError::invalid("degrees_of_freedom", e.to_string()))?;
    Ok(1.0 - chi.cdf(statistic.max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_exceedances_closed_form() {
        let lr = calculate_kupiec_test(0, 250, 0.05).unwrap();
        assert_eq!(lr, -2.0 * 250.0 * (0.95_f64).ln());
    }

    #[test]
    fn test_all_exceedances_closed_form() {
        let lr = calculate_kupiec_test(250, 250, 0.05).unwrap();
        assert_eq!(lr, -2.0 * 250.0 * (0.05_f64).ln());
    }

    #[test]
    fn test_exact_coverage_is_zero() {
        let lr = calculate_kupiec_test(25, 500, 0.05).unwrap();
        assert_abs_diff_eq!(lr, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_statistic_non_negative() {
        for x in 0..=100 {
            assert!(calculate_kupiec_test(x, 100, 0.01).unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_reference_value() {
        // 20 breaches in 250 days at 95% rejects, 15 does not
        let lr = calculate_kupiec_test(20, 250, 0.05).unwrap();
        assert_abs_diff_eq!(lr, 4.0395, epsilon = 1e-3);
        assert!(lr > KUPIEC_CRITICAL_VALUE);
        assert!(calculate_kupiec_test(15, 250, 0.05).unwrap() < KUPIEC_CRITICAL_VALUE);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(calculate_kupiec_test(5, 0, 0.05).is_err());
        assert!(calculate_kupiec_test(11, 10, 0.05).is_err());
        assert!(calculate_kupiec_test(1, 10, 0.0).is_err());
        assert!(calculate_kupiec_test(1, 10, 1.0).is_err());
    }

    #[test]
    fn test_p_value() {
        let p = kupiec_p_value(3.841459).unwrap();
        assert_abs_diff_eq!(p, 0.05, epsilon = 1e-4);
        assert_abs_diff_eq!(kupiec_p_value(0.0).unwrap(), 1.0, epsilon = 1e-12);
    }
}
