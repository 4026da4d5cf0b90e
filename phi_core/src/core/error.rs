//! Error types for engine operations.

/// Result type for engine operations
pub type PhiResult<T> = Result<T, PhiError>;

/// Error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum PhiError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid resampling ratio: {0}")]
    InvalidResamplingRatio(String),

    #[error("Undefined climatology: {0}")]
    UndefinedClimatology(String),

    #[error("Invalid loading: {0}")]
    InvalidLoading(String),

    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Data validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<String> for PhiError {
    fn from(s: String) -> Self {
        PhiError::Validation(s)
    }
}

impl From<&str> for PhiError {
    fn from(s: &str) -> Self {
        PhiError::Validation(s.to_string())
    }
}
