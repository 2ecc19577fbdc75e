//! Error types for the anofox-approximators library.

use thiserror::Error;

/// Result type alias for approximator operations.
pub type Result<T> = std::result::Result<T, ApproxError>;

/// Errors that can occur while fitting or querying approximators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApproxError {
    /// Model has never been fitted.
    #[error("model must be fitted before prediction")]
    NotFitted,

    /// The model does not provide the requested capability.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Invalid configuration value (aggregation mode, member count, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Wrong number of positional inputs.
    #[error("invalid arity: expected {expected} inputs, got {got}")]
    InvalidArity { expected: &'static str, got: usize },

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Array shapes cannot be combined.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// I/O failure while writing run summaries.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<ndarray::ShapeError> for ApproxError {
    fn from(err: ndarray::ShapeError) -> Self {
        ApproxError::ShapeMismatch(err.to_string())
    }
}

impl From<std::io::Error> for ApproxError {
    fn from(err: std::io::Error) -> Self {
        ApproxError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ApproxError::NotFitted;
        assert_eq!(err.to_string(), "model must be fitted before prediction");

        let err = ApproxError::InvalidArity {
            expected: "1 or 2",
            got: 3,
        };
        assert_eq!(err.to_string(), "invalid arity: expected 1 or 2 inputs, got 3");

        let err = ApproxError::InvalidConfiguration("unknown prediction mode 'median'".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: unknown prediction mode 'median'"
        );

        let err = ApproxError::IndexOutOfBounds { index: 4, size: 3 };
        assert_eq!(err.to_string(), "index out of bounds: 4 (size: 3)");
    }

    #[test]
    fn shape_errors_convert() {
        let arr = ndarray::ArrayD::<f64>::zeros(ndarray::IxDyn(&[2, 3]));
        let err: ApproxError = arr
            .into_dimensionality::<ndarray::Ix1>()
            .unwrap_err()
            .into();
        assert!(matches!(err, ApproxError::ShapeMismatch(_)));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ApproxError::NotFitted;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
        assert_ne!(err1, ApproxError::EmptyData);
    }
}
