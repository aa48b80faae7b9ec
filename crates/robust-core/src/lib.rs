//! Core traits and types for robust calibration estimators
//!
//! This crate provides the pieces shared by every other crate in the
//! workspace: the unified [`Error`] type, the [`WeightedSample`] input
//! model and the [`WeightedEstimator`] trait.
//!
//! # Example
//!
//! ```rust
//! use robust_core::{WeightedSample, Error};
//!
//! let sample = WeightedSample::new(&[0.98, 1.01, 1.03], &[1.0, 2.0, 1.0]).unwrap();
//! assert_eq!(sample.len(), 3);
//!
//! // Mismatched inputs are rejected up front
//! let err = WeightedSample::new(&[1.0, 2.0], &[1.0]).unwrap_err();
//! assert!(matches!(err, Error::InvalidInput(_)));
//! ```

pub mod error;
pub mod sample;
pub mod traits;
pub mod utils;

// Re-export core types
pub use error::{Error, Result};
pub use sample::{Observation, WeightedSample};
pub use traits::WeightedEstimator;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::{Observation, Result, WeightedEstimator, WeightedSample};
}
