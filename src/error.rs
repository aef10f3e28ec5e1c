//! Error types for the finops-anomaly library.

use thiserror::Error;

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, DetectionError>;

/// Errors that can occur while annotating a cost series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The seasonal-trend decomposition could not be fitted.
    #[error("decomposition failure: {0}")]
    DecompositionFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = DetectionError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = DetectionError::InsufficientData { needed: 14, got: 9 };
        assert_eq!(err.to_string(), "insufficient data: need at least 14, got 9");

        let err = DetectionError::InvalidParameter("drift window must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: drift window must be positive"
        );

        let err = DetectionError::DecompositionFailure("constant cost series".to_string());
        assert_eq!(
            err.to_string(),
            "decomposition failure: constant cost series"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = DetectionError::DecompositionFailure("x".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
        assert_ne!(err1, DetectionError::EmptyData);
    }
}
