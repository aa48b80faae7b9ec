//! Error types for robust calibration estimators
//!
//! Provides a unified error type for all robust-calibration crates.

use thiserror::Error;

/// Core error type for robust estimation and fitting
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Input that is well-formed but carries no usable mass
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// An iterative estimator hit its iteration cap
    #[error("Did not converge after {iterations} iterations (last change {last_delta:e})")]
    DidNotConverge { iterations: usize, last_delta: f64 },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Fit engine failure that cannot be expressed as a fit status
    #[error("Fit error: {0}")]
    Fit(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for empty input
    pub fn empty_input(operation: &str) -> Self {
        Self::DegenerateInput(format!("{operation} requires a non-empty sample"))
    }

    /// Create an error for a mass fraction outside (0, 1]
    pub fn invalid_fraction(fraction: f64) -> Self {
        Self::InvalidParameter(format!("Fraction {fraction} must be in (0, 1]"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }

    /// Whether this error reports degenerate input rather than a caller bug
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateInput(_) | Self::InsufficientData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("window must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: window must be positive");

        let err = Error::InsufficientData { expected: 10, actual: 5 };
        assert_eq!(err.to_string(), "Insufficient data: expected at least 10 samples, got 5");

        let err = Error::DegenerateInput("zero integral".to_string());
        assert_eq!(err.to_string(), "Degenerate input: zero integral");

        let err = Error::Fit("no free parameters".to_string());
        assert_eq!(err.to_string(), "Fit error: no free parameters");
    }

    #[test]
    fn test_did_not_converge_display() {
        let err = Error::DidNotConverge { iterations: 50, last_delta: 0.25 };
        let msg = err.to_string();
        assert!(msg.contains("50 iterations"));
        assert!(msg.contains("2.5e-1"));
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::empty_input("plain mean");
        assert!(err.is_degenerate());
        assert_eq!(err.to_string(), "Degenerate input: plain mean requires a non-empty sample");

        let err = Error::invalid_fraction(1.5);
        assert_eq!(err.to_string(), "Invalid parameter: Fraction 1.5 must be in (0, 1]");
        assert!(!err.is_degenerate());

        let err = Error::size_mismatch(100, 50, "weight vector");
        assert_eq!(err.to_string(), "Invalid input: Size mismatch in weight vector: expected 100, got 50");

        let err = Error::non_finite("input data");
        assert_eq!(err.to_string(), "Computation error: input data contains NaN or infinite values");
    }

    #[test]
    fn test_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("custom error message");
        let err: Error = anyhow_err.into();

        match err {
            Error::Other(_) => {
                assert!(err.to_string().contains("custom error message"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_error_chaining() {
        fn inner_function() -> Result<()> {
            Err(Error::Computation("inner error".to_string()))
        }

        fn outer_function() -> Result<()> {
            inner_function().map_err(|e| Error::Fit(format!("outer error: {}", e)))
        }

        let err = outer_function().unwrap_err();
        assert!(err.to_string().contains("outer error"));
        assert!(err.to_string().contains("inner error"));
    }
}
