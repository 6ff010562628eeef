use rand::Rng;
use std::f64::consts::PI;

use crate::error::RiskError;
use crate::RiskResult;

// Beasley-Springer-Moro coefficients.
const A: [f64; 4] = [
    2.50662823884,
    -18.61500062529,
    41.39119773534,
    -25.44106049637,
];
const B: [f64; 4] = [
    -8.47351093090,
    23.08336743743,
    -21.06224101826,
    3.13082909833,
];
const C: [f64; 9] = [
    0.3374754822726147,
    0.9761690190917186,
    0.1607979714918209,
    0.0276438810333863,
    0.0038405729373609,
    0.0003951896511919,
    0.0000321767881768,
    0.0000002888167364,
    0.0000003960315187,
];

/// Standard normal quantile via the Beasley-Springer-Moro approximation.
///
/// Fails with `InvalidParameter` unless `0 < p < 1`.
pub fn normal_inverse(p: f64) -> RiskResult<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(RiskError::invalid(
            "probability",
            format!("must lie strictly between 0 and 1, got {p}"),
        ));
    }

    let y = p - 0.5;
    if y.abs() < 0.42 {
        let r = y * y;
        let num = y * (((A[3] * r + A[2]) * r + A[1]) * r + A[0]);
        let den = (((B[3] * r + B[2]) * r + B[1]) * r + B[0]) * r + 1.0;
        return Ok(num / den);
    }

    let r = if y > 0.0 { 1.0 - p } else { p };
    let s = (-r.ln()).ln();
    let mut x = C[8];
    for c in C[..8].iter().rev() {
        x = x * s + c;
    }
    Ok(if y < 0.0 { -x } else { x })
}

/// Standard normal density.
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// One standard normal deviate from two independent uniforms.
pub fn box_muller_random<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_known_quantiles() {
        assert_abs_diff_eq!(normal_inverse(0.5).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normal_inverse(0.95).unwrap(), 1.6448536, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_inverse(0.05).unwrap(), -1.6448536, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_inverse(0.01).unwrap(), -2.3263479, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_inverse(0.975).unwrap(), 1.9599640, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_range_probability() {
        for p in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                normal_inverse(p),
                Err(RiskError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_pdf_peak() {
        assert_abs_diff_eq!(normal_pdf(0.0), 0.3989422804, epsilon = 1e-9);
    }

    #[test]
    fn test_box_muller_moments() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..50_000).map(|_| box_muller_random(&mut rng)).collect();
        let m = draws.iter().sum::<f64>() / draws.len() as f64;
        let v = draws.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (draws.len() - 1) as f64;
        assert_abs_diff_eq!(m, 0.0, epsilon = 0.02);
        assert_abs_diff_eq!(v, 1.0, epsilon = 0.03);
    }
}
