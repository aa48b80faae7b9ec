//! Robust calibration of multiplicative correction factors
//!
//! This crate re-exports the workspace members:
//!
//! - [`robust_core`]: error type, weighted samples and the estimator trait
//! - [`robust_histogram`]: fixed-width weighted distributions
//! - [`robust_fit`]: bounded nonlinear fits of models to distributions
//! - [`robust_scale`]: the location and scale estimators
//!
//! # Example
//!
//! ```rust
//! use robust_calibration::prelude::*;
//!
//! let values = [0.97, 0.99, 1.0, 1.0, 1.01, 1.03, 1.4];
//! let sample = WeightedSample::unweighted(&values).unwrap();
//!
//! let trimmed = RecursiveMean::default().estimate(&sample).unwrap();
//! let shortest = ShortestInterval::with_fraction(0.5).estimate(&sample).unwrap();
//! println!("trimmed {trimmed}, shortest {shortest}");
//! ```

pub use robust_core;
pub use robust_fit;
pub use robust_histogram;
pub use robust_scale;

pub use robust_core::{Error, Result, WeightedSample};
pub use robust_scale::{
    plain_mean, recursive_mean, shortest_interval, shortest_interval_binned,
    shortest_interval_filled, staged_peak_fit, template_scale_fit,
};

/// Prelude with the types needed to run any estimator
pub mod prelude {
    pub use robust_core::prelude::*;
    pub use robust_fit::{FitMethod, FitStatus, FitterConfig, Minimizer};
    pub use robust_histogram::{BinnedDistribution, HistogramBuilder, HistogramOps};
    pub use robust_scale::{
        BinnedEstimator, BinnedShortestInterval, FilledShortestInterval, PeakFitParameters,
        PlainMean, PointEstimate, RecursiveMean, RecursiveMeanParameters, ShortestInterval,
        StagedPeakFit, TemplateEstimator, TemplateFitParameters, TemplateScaleFit,
    };
}
