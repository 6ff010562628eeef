use serde::{Deserialize, Serialize};
use tracing::debug;

use super::descriptive::{mad, mean, median, std_dev};

/// Below this many points outlier rejection is skipped entirely.
pub const MIN_OUTLIER_OBSERVATIONS: usize = 10;

/// Default cut-off for the modified z-score.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.5;

/// Consistency constant tying MAD to the standard deviation of a normal.
const MODIFIED_Z_SCALE: f64 = 0.6745;

/// Outlier scoring rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// `0.6745 * (x - median) / MAD`
    #[default]
    ModifiedZScore,
    /// `(x - mean) / std_dev`
    ZScore,
}

/// Drop points whose absolute score exceeds `threshold`.
///
/// Series shorter than [`MIN_OUTLIER_OBSERVATIONS`] and series with zero
/// dispersion (MAD or standard deviation of 0) come back unchanged.
pub fn remove_outliers(data: &[f64], method: OutlierMethod, threshold: f64) -> Vec<f64> {
    let flags = outlier_flags(data, method, threshold);
    let cleaned: Vec<f64> = data
        .iter()
        .zip(flags.iter())
        .filter(|(_, &flagged)| !flagged)
        .map(|(&x, _)| x)
        .collect();

    let removed = data.len() - cleaned.len();
    if removed > 0 {
        debug!(removed, total = data.len(), ?method, "outliers removed");
    }
    cleaned
}

/// Per-point outlier flags, `true` where the score exceeds `threshold`.
///
/// Same pass-through rules as [`remove_outliers`]: nothing is flagged on a
/// short or zero-dispersion series. Use this when several date-aligned
/// series must drop the same periods.
pub fn outlier_flags(data: &[f64], method: OutlierMethod, threshold: f64) -> Vec<bool> {
    if data.len() < MIN_OUTLIER_OBSERVATIONS {
        return vec![false; data.len()];
    }

    let (centre, scale) = match method {
        OutlierMethod::ModifiedZScore => {
            let dispersion = mad(data);
            if dispersion <= 0.0 {
                return vec![false; data.len()];
            }
            (median(data), dispersion / MODIFIED_Z_SCALE)
        }
        OutlierMethod::ZScore => {
            let s = std_dev(data);
            if s <= 0.0 {
                return vec![false; data.len()];
            }
            (mean(data), s)
        }
    };
    data.iter()
        .map(|x| ((x - centre) / scale).abs() > threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clean_series() -> Vec<f64> {
        (0..40).map(|i| 0.001 * ((i as f64) * 0.7).sin()).collect()
    }

    #[test]
    fn test_drops_spike() {
        let mut data = clean_series();
        data.push(0.5);
        let cleaned = remove_outliers(&data, OutlierMethod::ModifiedZScore, 3.5);
        assert_eq!(cleaned.len(), data.len() - 1);
        assert!(!cleaned.contains(&0.5));
    }

    #[test]
    fn test_idempotent_on_clean_data() {
        let data = clean_series();
        let once = remove_outliers(&data, OutlierMethod::ModifiedZScore, 3.5);
        let twice = remove_outliers(&once, OutlierMethod::ModifiedZScore, 3.5);
        assert_eq!(once, data);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_constant_series_unchanged() {
        let data = vec![0.002; 25];
        assert_eq!(
            remove_outliers(&data, OutlierMethod::ModifiedZScore, 3.5),
            data
        );
        assert_eq!(remove_outliers(&data, OutlierMethod::ZScore, 3.0), data);
    }

    #[test]
    fn test_short_series_is_noop() {
        let data = vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 9.0];
        assert_eq!(
            remove_outliers(&data, OutlierMethod::ModifiedZScore, 3.5),
            data
        );
    }

    #[test]
    fn test_flags_mark_spike_position() {
        let mut data = clean_series();
        data[17] = 0.5;
        let flags = outlier_flags(&data, OutlierMethod::ModifiedZScore, 3.5);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
        assert!(flags[17]);
        assert_eq!(
            outlier_flags(&[0.1; 5], OutlierMethod::ZScore, 3.0),
            vec![false; 5]
        );
    }

    #[test]
    fn test_plain_zscore_fallback() {
        let mut data = clean_series();
        data.push(0.05);
        let cleaned = remove_outliers(&data, OutlierMethod::ZScore, 3.0);
        assert_eq!(cleaned.len(), data.len() - 1);
    }
}
