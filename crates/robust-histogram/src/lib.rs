//! Weighted binned distributions for robust calibration
//!
//! This crate provides the fixed-width, weighted histogram that every
//! estimator in the workspace projects its samples onto. Each bin
//! accumulates both the sum of weights and the sum of squared weights so
//! that the standard error of the weighted mean is available for weighted
//! fills.
//!
//! # Key Features
//!
//! - **Weighted fills**: Sum-of-weights and sum-of-squared-weights per bin
//! - **Exact moments**: The mean uses the filled values, not bin centers
//! - **Auto-ranging**: Padded range around the sample extrema
//! - **Operations**: Range restriction, interpolation, normalization factors
//!
//! # Examples
//!
//! ## Auto-ranged distribution of a weighted sample
//!
//! ```rust
//! use robust_core::WeightedSample;
//! use robust_histogram::{AutoRangeBuilder, HistogramBuilder};
//!
//! let sample = WeightedSample::new(&[0.97, 1.00, 1.02, 1.05], &[1.0, 2.0, 2.0, 1.0]).unwrap();
//! let distribution = AutoRangeBuilder::default().build(&sample).unwrap();
//!
//! println!("{distribution}");
//! println!("mean = {:.4} +- {:.4}", distribution.mean(), distribution.mean_error());
//! ```
//!
//! ## Filling by hand
//!
//! ```rust
//! use robust_histogram::{BinnedDistribution, HistogramOps};
//!
//! let mut observed = BinnedDistribution::new(50, 0.5, 1.5).unwrap();
//! let mut reference = BinnedDistribution::new(100, 0.5, 1.5).unwrap();
//! for x in [0.95, 1.0, 1.0, 1.05] {
//!     observed.fill(x);
//!     reference.fill_weighted(x, 0.5);
//! }
//!
//! let factor = observed.normalization_factor(&reference).unwrap();
//! assert!((factor - 4.0).abs() < 1e-12);
//! ```

pub mod builders;
pub mod ops;
pub mod traits;
pub mod types;

// Re-export main types and traits
pub use builders::{AutoRangeBuilder, FixedRangeBuilder, DEFAULT_BINS, DEFAULT_PADDING};
pub use ops::HistogramOps;
pub use traits::HistogramBuilder;
pub use types::BinnedDistribution;

use robust_core::WeightedSample;

// Convenience functions
/// Create an auto-ranged distribution with the default 100 bins
pub fn auto_histogram(sample: &WeightedSample) -> crate::Result<BinnedDistribution> {
    AutoRangeBuilder::default().build(sample)
}

/// Create a distribution with `num_bins` bins over `[low, high)`
pub fn fixed_histogram(
    sample: &WeightedSample,
    num_bins: usize,
    low: f64,
    high: f64,
) -> crate::Result<BinnedDistribution> {
    FixedRangeBuilder::new(num_bins, low, high)?.build(sample)
}

pub use robust_core::Result;
