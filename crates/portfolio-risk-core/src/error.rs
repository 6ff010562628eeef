use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Insufficient data: {context} requires at least {required} observations, got {actual}")]
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RiskError {
    pub(crate) fn insufficient(context: &str, required: usize, actual: usize) -> Self {
        RiskError::InsufficientData {
            context: context.to_string(),
            required,
            actual,
        }
    }

    pub(crate) fn mismatch(context: &str, expected: usize, actual: usize) -> Self {
        RiskError::DimensionMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        RiskError::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(e: serde_json::Error) -> Self {
        RiskError::Serialization(e.to_string())
    }
}
