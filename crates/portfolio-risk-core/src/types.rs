use serde::{Deserialize, Serialize};

/// Periodic (daily) returns for a single asset, as decimals (0.01 = 1%).
pub type ReturnSeries = Vec<f64>;

/// One return series per asset. Series may differ in length.
pub type ReturnsMatrix = Vec<Vec<f64>>;

/// Per-asset portfolio weights, ordered like the returns matrix.
pub type WeightVector = Vec<f64>;

/// Dense row-major square matrix.
pub type Matrix = Vec<Vec<f64>>;

/// Trading periods per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_carries_warnings_and_version() {
        let out = with_metadata(
            "Test",
            &serde_json::json!({ "n": 3 }),
            vec!["careful".into()],
            42,
            1.5_f64,
        );
        assert_eq!(out.warnings, vec!["careful".to_string()]);
        assert_eq!(out.metadata.computation_time_us, 42);
        assert_eq!(out.metadata.precision, "ieee754_f64");
        assert_eq!(out.assumptions["n"], 3);
    }
}
