//! Robust location and scale estimators for calibration
//!
//! Each estimator turns a one-dimensional weighted sample, or its binned
//! projection, into a point estimate with an uncertainty:
//!
//! - **Shortest interval**: mean of the narrowest interval holding a given
//!   fraction of the mass, on raw values, on bins, or after filling bins
//! - **Recursive mean**: trimmed mean re-centred until it stops moving
//! - **Plain mean**: weighted mean of everything
//! - **Staged peak fit**: Gaussian peak position from three chained fits
//! - **Template scale fit**: domain stretch between a reference and an
//!   observed distribution
//!
//! # Example
//!
//! ```rust
//! use robust_core::WeightedSample;
//! use robust_scale::{plain_mean, recursive_mean, shortest_interval};
//!
//! let values = [0.96, 0.99, 1.0, 1.01, 1.02, 1.04, 1.6];
//! let weights = [1.0; 7];
//! let sample = WeightedSample::new(&values, &weights).unwrap();
//!
//! let plain = plain_mean(&sample).unwrap();
//! let trimmed = recursive_mean(&sample, 0.1, 1e-6).unwrap();
//! let shortest = shortest_interval(&values, 0.5).unwrap();
//!
//! // the outlier at 1.6 pulls only the plain mean
//! assert!(plain.mean > trimmed.estimate.mean);
//! assert!(shortest.interval.contains(1.0));
//! ```

pub mod mean;
pub mod peak_fit;
pub mod recursive_mean;
pub mod shortest_interval;
pub mod template_fit;
pub mod traits;
pub mod types;

// Re-export main types and traits
pub use mean::PlainMean;
pub use peak_fit::{PeakFitParameters, StagedPeakFit};
pub use recursive_mean::{RecursiveMean, RecursiveMeanParameters};
pub use shortest_interval::{
    BinnedShortestInterval, FilledShortestInterval, FilledShortestIntervalParameters,
    ShortestInterval, ShortestIntervalParameters, DEFAULT_FRACTION,
};
pub use template_fit::{TemplateFitParameters, TemplateScaleFit};
pub use traits::{BinnedEstimator, TemplateEstimator};
pub use types::{
    IntervalEstimate, IntervalResult, PeakFitResult, PointEstimate, RecursiveMeanResult,
    StageReport, TemplateFitResult,
};

use robust_core::{WeightedEstimator, WeightedSample};
use robust_histogram::BinnedDistribution;

// Convenience functions
/// Shortest interval holding `fraction` of the raw values
pub fn shortest_interval(values: &[f64], fraction: f64) -> Result<IntervalEstimate> {
    ShortestInterval::with_fraction(fraction).estimate_values(values)
}

/// Shortest bin range holding `fraction` of a distribution's integral
pub fn shortest_interval_binned(
    distribution: &BinnedDistribution,
    fraction: f64,
) -> Result<IntervalEstimate> {
    BinnedShortestInterval::new(fraction).estimate_binned(distribution)
}

/// Fill `[start_min, start_max)` with bins of width `precision`, then run the binned search
pub fn shortest_interval_filled(
    values: &[f64],
    weights: &[f64],
    start_min: f64,
    start_max: f64,
    precision: f64,
    fraction: f64,
) -> Result<IntervalEstimate> {
    let sample = WeightedSample::new(values, weights)?;
    let params = FilledShortestIntervalParameters::default()
        .with_range(start_min, start_max)
        .with_precision(precision)
        .with_fraction(fraction);
    FilledShortestInterval::new(params).estimate(&sample)
}

/// Weighted mean over a default auto-ranged distribution
pub fn plain_mean(sample: &WeightedSample) -> Result<PointEstimate> {
    PlainMean::default().estimate(sample)
}

/// Recursive trimmed mean with the given window half width and tolerance
pub fn recursive_mean(
    sample: &WeightedSample,
    window: f64,
    tolerance: f64,
) -> Result<RecursiveMeanResult> {
    RecursiveMean::new(RecursiveMeanParameters::new(window, tolerance)).estimate(sample)
}

/// Staged peak fit with explicit binning and starting mean
pub fn staged_peak_fit(
    sample: &WeightedSample,
    num_bins: usize,
    x_min: f64,
    x_max: f64,
    starting_mean: f64,
    name: &str,
) -> Result<PeakFitResult> {
    let params = PeakFitParameters::new(num_bins, x_min, x_max)
        .with_starting_mean(starting_mean)
        .with_name(name);
    StagedPeakFit::new(params).estimate(sample)
}

/// Template scale fit with default parameters
pub fn template_scale_fit(
    reference: &BinnedDistribution,
    observed: &BinnedDistribution,
) -> Result<TemplateFitResult> {
    TemplateScaleFit::default().estimate_template(reference, observed)
}

pub use robust_core::Result;
