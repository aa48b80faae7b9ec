//! Core traits for robust calibration estimators
//!
//! This module provides the foundational trait that sample-based
//! estimators build upon. Estimators over binned or paired inputs define
//! their own traits in the crates that own those input types.

use crate::{Result, WeightedSample};

/// Core trait for estimators over a weighted one-dimensional sample
///
/// Every estimator is a pure function of its configuration and input:
/// no state is kept between calls.
///
/// # Example
///
/// ```rust
/// use robust_core::{Result, WeightedEstimator, WeightedSample};
///
/// struct WeightedAverage;
///
/// impl WeightedEstimator for WeightedAverage {
///     type Output = f64;
///
///     fn estimate(&self, sample: &WeightedSample) -> Result<f64> {
///         let sum: f64 = sample.iter().map(|o| o.value * o.weight).sum();
///         Ok(sum / sample.total_weight())
///     }
///
///     fn name(&self) -> &str {
///         "Weighted average"
///     }
/// }
///
/// let sample = WeightedSample::new(&[1.0, 3.0], &[1.0, 1.0]).unwrap();
/// assert_eq!(WeightedAverage.estimate(&sample).unwrap(), 2.0);
/// ```
pub trait WeightedEstimator {
    /// Output type of the estimator
    type Output;

    /// Estimate the statistic from the given sample
    fn estimate(&self, sample: &WeightedSample) -> Result<Self::Output>;

    /// Human-readable name of the estimator
    fn name(&self) -> &str;
}
