/// Arithmetic mean. Returns 0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance (divides by n - 1). Returns 0 below two observations.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Bias-corrected sample skewness (G1).
pub fn skewness(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 3 {
        return 0.0;
    }
    let m = mean(data);
    let s = std_dev(data);
    if s <= f64::EPSILON {
        return 0.0;
    }
    let nf = n as f64;
    let sum_cubed: f64 = data.iter().map(|x| ((x - m) / s).powi(3)).sum();
    nf / ((nf - 1.0) * (nf - 2.0)) * sum_cubed
}

/// Bias-corrected sample kurtosis reported raw (normal = 3), not excess.
pub fn kurtosis(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 4 {
        return 3.0;
    }
    let m = mean(data);
    let s = std_dev(data);
    if s <= f64::EPSILON {
        return 3.0;
    }
    let nf = n as f64;
    let sum_fourth: f64 = data.iter().map(|x| ((x - m) / s).powi(4)).sum();
    let excess = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0)) * sum_fourth
        - 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    excess + 3.0
}

/// Median. Returns 0 for an empty slice.
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median absolute deviation around the median (unscaled).
pub fn mad(data: &[f64]) -> f64 {
    let med = median(data);
    let deviations: Vec<f64> = data.iter().map(|x| (x - med).abs()).collect();
    median(&deviations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_and_sample_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(mean(&data), 5.0, epsilon = 1e-12);
        // population variance is 4, sample variance 32 / 7
        assert_abs_diff_eq!(variance(&data), 32.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[1.0]), 0.0);
        assert_eq!(skewness(&[1.0, 1.0, 1.0, 1.0]), 0.0);
        assert_eq!(kurtosis(&[1.0, 1.0, 1.0, 1.0]), 3.0);
    }

    #[test]
    fn test_symmetric_data_has_zero_skew() {
        let data = [-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        assert_abs_diff_eq!(skewness(&data), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_right_tail_positive_skew() {
        let data = [1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 10.0];
        assert!(skewness(&data) > 1.0);
    }

    #[test]
    fn test_kurtosis_matches_bias_corrected_formula() {
        // Excel KURT([1..=10]) = -1.2, raw = 1.8
        let data: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        assert_abs_diff_eq!(kurtosis(&data), 1.8, epsilon = 1e-10);
    }

    #[test]
    fn test_median_and_mad() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        // deviations from 3: 2,1,0,1,6 -> median 1
        assert_eq!(mad(&[1.0, 2.0, 3.0, 4.0, 9.0]), 1.0);
    }
}
