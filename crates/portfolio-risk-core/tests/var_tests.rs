use approx::assert_abs_diff_eq;
use portfolio_risk_core::backtest::perform_backtest;
use portfolio_risk_core::matrix::normal_inverse;
use portfolio_risk_core::stress::{default_scenarios, run_stress_tests};
use portfolio_risk_core::var::{
    calculate_individual_historical_var, calculate_individual_parametric_var,
    calculate_monte_carlo_var_with, calculate_portfolio_var, VarConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const MU: f64 = 0.0005;
const SIGMA: f64 = 0.01;

fn gaussian(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(MU, SIGMA).unwrap();
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

fn theoretical_var(confidence: f64) -> f64 {
    -(MU + normal_inverse(1.0 - confidence).unwrap() * SIGMA)
}

// ===========================================================================
// Convergence on i.i.d. Gaussian returns
// ===========================================================================

#[test]
fn test_parametric_var_converges() {
    let expected = theoretical_var(0.95);
    assert_abs_diff_eq!(expected, 0.015949, epsilon = 1e-5);

    let small = calculate_individual_parametric_var(&gaussian(2_000, 1), 0.95, 1.0).unwrap();
    assert_abs_diff_eq!(small.var, expected, epsilon = 1e-3);

    let large = calculate_individual_parametric_var(&gaussian(100_000, 2), 0.95, 1.0).unwrap();
    assert_abs_diff_eq!(large.var, expected, epsilon = 2.5e-4);
}

#[test]
fn test_historical_var_converges() {
    let expected = theoretical_var(0.95);

    let small = calculate_individual_historical_var(&gaussian(2_000, 3), 0.95, 1.0).unwrap();
    assert_abs_diff_eq!(small.var, expected, epsilon = 1.5e-3);

    let large = calculate_individual_historical_var(&gaussian(100_000, 4), 0.95, 1.0).unwrap();
    assert_abs_diff_eq!(large.var, expected, epsilon = 3e-4);
}

#[test]
fn test_monte_carlo_matches_parametric() {
    let returns = vec![gaussian(1_000, 5), gaussian(1_000, 6)];
    let weights = [0.5, 0.5];
    let parametric = calculate_portfolio_var(&returns, &weights, 0.95, 1.0).unwrap();
    let config = VarConfig {
        simulations: 50_000,
        seed: Some(9),
        ..VarConfig::default()
    };
    let mc = calculate_monte_carlo_var_with(&returns, &weights, &config).unwrap();
    let rel = (mc.var - parametric.portfolio.var).abs() / parametric.portfolio.var;
    assert!(
        rel < 0.10,
        "mc {} parametric {}",
        mc.var,
        parametric.portfolio.var
    );
}

// ===========================================================================
// Downstream consumers
// ===========================================================================

#[test]
fn test_backtest_parametric_threshold_on_gaussian() {
    let returns = vec![gaussian(2_000, 7)];
    let var = calculate_individual_parametric_var(&returns[0], 0.95, 1.0).unwrap();
    let out_of_sample = vec![gaussian(1_000, 8)];
    let result = perform_backtest(&out_of_sample, &[1.0], var.var, 0.95, 1.0).unwrap();
    assert_eq!(result.observations, 1_000);
    assert!((result.exceedance_rate - 0.05).abs() < 0.02);
    assert!(result.kupiec_statistic >= 0.0);
}

#[test]
fn test_stress_on_gaussian_portfolio() {
    let returns = vec![gaussian(500, 10), gaussian(500, 11), gaussian(500, 12)];
    let report = run_stress_tests(
        &returns,
        &[0.4, 0.4, 0.2],
        &default_scenarios(),
        0.99,
        1_000_000.0,
    )
    .unwrap();
    assert!(report.results.iter().all(|r| r.stressed_var > report.base_var));
    assert!(report.probability_weighted_loss > 0.0);
}
