//! Descriptive statistics, robust outlier rejection and correlation.

pub mod correlation;
pub mod descriptive;
pub mod outliers;

pub use correlation::{
    calculate_robust_correlation_matrix, regularize_correlation_matrix, robust_correlation,
};
pub use descriptive::{kurtosis, mad, mean, median, skewness, std_dev, variance};
pub use outliers::{outlier_flags, remove_outliers, OutlierMethod};
