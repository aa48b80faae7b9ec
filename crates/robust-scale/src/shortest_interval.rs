//! Shortest interval covering a fraction of the mass
//!
//! Three flavours share the same idea: find the narrowest interval holding
//! `fraction` of the sample, then report the weighted mean of what falls
//! inside it.
//!
//! - [`ShortestInterval`] slides a window of `floor(fraction * n)` points
//!   over the sorted raw values; weights are ignored.
//! - [`BinnedShortestInterval`] scans pairs of bins using prefix sums of
//!   the bin contents. For each lower bin only the first upper bin that
//!   reaches the target mass is considered, so the search is greedy per
//!   lower bin.
//! - [`FilledShortestInterval`] fills a fixed-width distribution from a
//!   weighted sample and delegates to the binned search.

use crate::traits::BinnedEstimator;
use crate::types::{IntervalEstimate, IntervalResult, PointEstimate};
use robust_core::utils::{points_for_fraction, sorted};
use robust_core::{Error, Result, WeightedEstimator, WeightedSample};
use robust_histogram::{
    AutoRangeBuilder, BinnedDistribution, FixedRangeBuilder, HistogramBuilder, HistogramOps,
    DEFAULT_BINS, DEFAULT_PADDING,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Fraction used when none is given
pub const DEFAULT_FRACTION: f64 = 0.68;

fn check_fraction(fraction: f64) -> Result<()> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_fraction(fraction))
    }
}

/// Parameters for the raw-sample shortest interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortestIntervalParameters {
    /// Fraction of points the interval must hold, in `(0, 1]`
    pub fraction: f64,
    /// Bins of the distribution the selected points are projected onto
    pub num_bins: usize,
    /// Relative padding of that distribution's range
    pub padding: f64,
}

impl Default for ShortestIntervalParameters {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_FRACTION,
            num_bins: DEFAULT_BINS,
            padding: DEFAULT_PADDING,
        }
    }
}

impl ShortestIntervalParameters {
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }

    pub fn with_num_bins(mut self, num_bins: usize) -> Self {
        self.num_bins = num_bins;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

/// Shortest interval over raw sorted values
#[derive(Debug, Clone, Default)]
pub struct ShortestInterval {
    params: ShortestIntervalParameters,
}

impl ShortestInterval {
    pub fn new(params: ShortestIntervalParameters) -> Self {
        Self { params }
    }

    /// Shortest interval with the given fraction and default binning
    pub fn with_fraction(fraction: f64) -> Self {
        Self::new(ShortestIntervalParameters::default().with_fraction(fraction))
    }

    pub fn parameters(&self) -> &ShortestIntervalParameters {
        &self.params
    }

    /// Find the narrowest window of `floor(fraction * n)` consecutive sorted values
    pub fn find_interval(&self, values: &[f64]) -> Result<(IntervalResult, Vec<f64>)> {
        check_fraction(self.params.fraction)?;
        if values.is_empty() {
            return Err(Error::empty_input("shortest interval"));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::non_finite("shortest interval values"));
        }

        let sorted = sorted(values);
        let n = sorted.len();
        let k = points_for_fraction(self.params.fraction, n);
        if k == 0 {
            return Err(Error::DegenerateInput(format!(
                "fraction {} of {n} points selects no point",
                self.params.fraction
            )));
        }

        let mut best = 0;
        let mut delta = f64::INFINITY;
        for pos in 0..=n - k {
            let span = sorted[pos + k - 1] - sorted[pos];
            if span < delta {
                delta = span;
                best = pos;
            }
        }
        let interval = IntervalResult::new(sorted[best], sorted[best + k - 1]);
        debug!(n, k, %interval, "Selected shortest window");
        Ok((interval, sorted[best..best + k].to_vec()))
    }

    /// Estimate from raw values
    #[instrument(skip(self, values), fields(n = values.len(), fraction = self.params.fraction))]
    pub fn estimate_values(&self, values: &[f64]) -> Result<IntervalEstimate> {
        let (interval, window) = self.find_interval(values)?;

        let builder = AutoRangeBuilder::new(self.params.num_bins).with_padding(self.params.padding);
        let (low, high) = builder.range_for(interval.min, interval.max);
        let mut distribution = BinnedDistribution::new(self.params.num_bins, low, high)?;
        for &x in &window {
            distribution.fill(x);
        }

        let estimate = PointEstimate::from_distribution(&distribution)?;
        Ok(IntervalEstimate { estimate, interval })
    }
}

impl WeightedEstimator for ShortestInterval {
    type Output = IntervalEstimate;

    /// Uses the sample's values only
    fn estimate(&self, sample: &WeightedSample) -> Result<IntervalEstimate> {
        self.estimate_values(sample.values())
    }

    fn name(&self) -> &str {
        "Shortest Interval"
    }
}

/// Shortest interval over the bins of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinnedShortestInterval {
    /// Fraction of the integral the interval must hold, in `(0, 1]`
    pub fraction: f64,
}

impl Default for BinnedShortestInterval {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_FRACTION,
        }
    }
}

impl BinnedShortestInterval {
    pub fn new(fraction: f64) -> Self {
        Self { fraction }
    }

    /// Find `[center(b1), center(b2)]` of minimal width whose mass
    /// `prefix[b2] - prefix[b1]` reaches `fraction` of the integral
    pub fn find_interval(&self, distribution: &BinnedDistribution) -> Result<IntervalResult> {
        check_fraction(self.fraction)?;
        let integral = distribution.integral();
        if !(integral > 0.0) {
            return Err(Error::DegenerateInput(format!(
                "shortest interval needs a positive integral, got {integral}"
            )));
        }

        let target = self.fraction * integral;
        let prefix = distribution.cumulative();
        let n = distribution.len();

        let mut best: Option<(usize, usize)> = None;
        let mut delta = f64::INFINITY;
        for b1 in 0..n {
            for b2 in b1 + 1..n {
                if prefix[b2] - prefix[b1] < target {
                    continue;
                }
                let span = distribution.bin_center(b2) - distribution.bin_center(b1);
                if span < delta {
                    delta = span;
                    best = Some((b1, b2));
                }
                break;
            }
        }

        let (b1, b2) = best.ok_or_else(|| {
            Error::DegenerateInput(format!(
                "no pair of bins holds {} of the integral {integral}",
                self.fraction
            ))
        })?;
        Ok(IntervalResult::new(
            distribution.bin_center(b1),
            distribution.bin_center(b2),
        ))
    }
}

impl BinnedEstimator for BinnedShortestInterval {
    type Output = IntervalEstimate;

    #[instrument(skip(self, distribution), fields(bins = distribution.len(), fraction = self.fraction))]
    fn estimate_binned(&self, distribution: &BinnedDistribution) -> Result<IntervalEstimate> {
        let interval = self.find_interval(distribution)?;
        let inside = distribution.restricted_to(interval.min, interval.max);
        debug!(%interval, integral = inside.integral(), "Selected shortest bin range");

        let estimate = PointEstimate::from_distribution(&inside)?;
        Ok(IntervalEstimate { estimate, interval })
    }

    fn name(&self) -> &str {
        "Binned Shortest Interval"
    }
}

/// Parameters for the fill-then-bin shortest interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilledShortestIntervalParameters {
    pub start_min: f64,
    pub start_max: f64,
    /// Bin width; the bin count is `floor((start_max - start_min) / precision)`
    pub precision: f64,
    pub fraction: f64,
}

impl Default for FilledShortestIntervalParameters {
    fn default() -> Self {
        Self {
            start_min: 0.5,
            start_max: 1.5,
            precision: 0.001,
            fraction: DEFAULT_FRACTION,
        }
    }
}

impl FilledShortestIntervalParameters {
    pub fn with_range(mut self, start_min: f64, start_max: f64) -> Self {
        self.start_min = start_min;
        self.start_max = start_max;
        self
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }
}

/// Fill a fixed-width distribution from a weighted sample, then run the
/// binned search on it
#[derive(Debug, Clone, Default)]
pub struct FilledShortestInterval {
    params: FilledShortestIntervalParameters,
}

impl FilledShortestInterval {
    pub fn new(params: FilledShortestIntervalParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &FilledShortestIntervalParameters {
        &self.params
    }

    /// The distribution the binned search runs on
    pub fn distribution(&self, sample: &WeightedSample) -> Result<BinnedDistribution> {
        let p = &self.params;
        FixedRangeBuilder::with_bin_width(p.start_min, p.start_max, p.precision)?.build(sample)
    }
}

impl WeightedEstimator for FilledShortestInterval {
    type Output = IntervalEstimate;

    #[instrument(skip(self, sample), fields(n = sample.len(), precision = self.params.precision))]
    fn estimate(&self, sample: &WeightedSample) -> Result<IntervalEstimate> {
        let distribution = self.distribution(sample)?;
        BinnedShortestInterval::new(self.params.fraction).estimate_binned(&distribution)
    }

    fn name(&self) -> &str {
        "Filled Shortest Interval"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_raw_picks_densest_window() {
        let values = [0.2, 1.0, 1.01, 1.02, 1.03, 2.5, 3.0, 0.98];
        let result = ShortestInterval::with_fraction(0.5).estimate_values(&values).unwrap();
        assert_relative_eq!(result.interval.min, 1.0);
        assert_relative_eq!(result.interval.max, 1.03);
        assert_relative_eq!(result.estimate.mean, 1.015, epsilon = 1e-12);
    }

    #[test]
    fn test_raw_whole_sample() {
        let values = [3.0, 1.0, 2.0];
        let result = ShortestInterval::with_fraction(1.0).estimate_values(&values).unwrap();
        assert_eq!(result.interval, IntervalResult::new(1.0, 3.0));
        assert_relative_eq!(result.estimate.mean, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_raw_ignores_weights() {
        let sample = WeightedSample::new(&[1.0, 1.1, 1.3, 5.0], &[1.0, 1.0, 100.0, 1.0]).unwrap();
        let result = ShortestInterval::with_fraction(0.5).estimate(&sample).unwrap();
        assert_relative_eq!(result.interval.min, 1.0);
        assert_relative_eq!(result.interval.max, 1.1);
        assert_relative_eq!(result.estimate.mean, 1.05, epsilon = 1e-12);
    }

    #[test]
    fn test_raw_identical_values() {
        let result = ShortestInterval::with_fraction(0.5)
            .estimate_values(&[1.0, 1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(result.interval.width(), 0.0);
        assert_relative_eq!(result.estimate.mean, 1.0);
    }

    #[test]
    fn test_raw_degenerate_inputs() {
        let too_small = ShortestInterval::with_fraction(0.1).estimate_values(&[1.0, 2.0, 3.0]);
        assert!(matches!(too_small, Err(Error::DegenerateInput(_))));

        let empty = ShortestInterval::default().estimate_values(&[]);
        assert!(matches!(empty, Err(Error::DegenerateInput(_))));

        let bad = ShortestInterval::with_fraction(1.5).estimate_values(&[1.0]);
        assert!(matches!(bad, Err(Error::InvalidParameter(_))));

        let nan = ShortestInterval::with_fraction(1.0).estimate_values(&[1.0, f64::NAN]);
        assert!(nan.is_err());
    }

    fn peaked() -> BinnedDistribution {
        let mut h = BinnedDistribution::new(10, 0.0, 1.0).unwrap();
        for (i, c) in [0.0, 1.0, 2.0, 10.0, 30.0, 40.0, 10.0, 5.0, 2.0, 0.0].into_iter().enumerate() {
            if c > 0.0 {
                h.fill_weighted(h.bin_center(i), c);
            }
        }
        h
    }

    #[test]
    fn test_binned_prefix_semantics() {
        let h = peaked();
        // total 100; (3, 5] holds 70, nothing narrower reaches 65
        let interval = BinnedShortestInterval::new(0.65).find_interval(&h).unwrap();
        assert_relative_eq!(interval.min, 0.35, epsilon = 1e-12);
        assert_relative_eq!(interval.max, 0.55, epsilon = 1e-12);

        let result = BinnedShortestInterval::new(0.65).estimate_binned(&h).unwrap();
        // bins 3, 4 and 5 are kept, including the lower edge bin
        let expected = (0.35 * 10.0 + 0.45 * 30.0 + 0.55 * 40.0) / 80.0;
        assert_relative_eq!(result.estimate.mean, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_binned_no_qualifying_pair() {
        let mut h = BinnedDistribution::new(4, 0.0, 1.0).unwrap();
        h.fill_weighted(0.1, 1.0);
        h.fill_weighted(0.9, 1.0);
        // the first bin's content never enters a pair's mass
        let result = BinnedShortestInterval::new(1.0).estimate_binned(&h);
        assert!(matches!(result, Err(Error::DegenerateInput(_))));

        let empty = BinnedDistribution::new(4, 0.0, 1.0).unwrap();
        assert!(BinnedShortestInterval::new(0.5).estimate_binned(&empty).is_err());
    }

    #[test]
    fn test_filled_variant() {
        let values: Vec<f64> = (0..200).map(|i| 0.9 + 0.001 * i as f64).collect();
        let weights = vec![1.0; values.len()];
        let sample = WeightedSample::new(&values, &weights).unwrap();

        let params = FilledShortestIntervalParameters::default()
            .with_range(0.75, 1.25)
            .with_precision(1.0 / 64.0)
            .with_fraction(0.5);
        let estimator = FilledShortestInterval::new(params);
        assert_eq!(estimator.distribution(&sample).unwrap().len(), 32);

        let result = estimator.estimate(&sample).unwrap();
        assert!(result.interval.min >= 0.88 && result.interval.max <= 1.12);
        assert!(result.interval.width() >= 0.09);
        assert!(result.interval.contains(result.estimate.mean));
    }
}
