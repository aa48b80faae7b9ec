//! Binning strategies for weighted samples

use crate::traits::HistogramBuilder;
use robust_core::{utils::padded_range, Error, Result, WeightedSample};
use serde::{Deserialize, Serialize};

/// Default number of bins for auto-ranged distributions
pub const DEFAULT_BINS: usize = 100;

/// Default fraction of the sample span added on each side of the range
pub const DEFAULT_PADDING: f64 = 0.1;

/// Auto-ranging builder
///
/// Spans `[min - padding * span, max + padding * span]` of the sample
/// with a fixed number of equal-width bins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoRangeBuilder {
    num_bins: usize,
    padding: f64,
}

impl Default for AutoRangeBuilder {
    fn default() -> Self {
        Self {
            num_bins: DEFAULT_BINS,
            padding: DEFAULT_PADDING,
        }
    }
}

impl AutoRangeBuilder {
    /// Create a new auto-ranging builder with `num_bins` bins
    pub fn new(num_bins: usize) -> Self {
        Self {
            num_bins: num_bins.max(1),
            ..Self::default()
        }
    }

    /// Set the padding fraction (negative values are treated as zero)
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Range that this builder would use for values spanning `[min, max]`
    pub fn range_for(&self, min: f64, max: f64) -> (f64, f64) {
        padded_range(min, max, self.padding)
    }
}

impl HistogramBuilder for AutoRangeBuilder {
    fn binning(&self, sample: &WeightedSample) -> Result<(usize, f64, f64)> {
        let (min, max) = sample.min_max();
        let (low, high) = self.range_for(min, max);
        Ok((self.num_bins, low, high))
    }
}

/// Fixed-range builder
///
/// Uses a caller-specified range, with either an explicit bin count or a
/// bin width from which the count is derived as `floor((high - low) / width)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedRangeBuilder {
    num_bins: usize,
    low: f64,
    high: f64,
}

impl FixedRangeBuilder {
    /// Create a builder with `num_bins` bins over `[low, high)`
    pub fn new(num_bins: usize, low: f64, high: f64) -> Result<Self> {
        if num_bins == 0 {
            return Err(Error::InvalidParameter("number of bins must be at least 1".to_string()));
        }
        if !(low < high) {
            return Err(Error::InvalidParameter(format!(
                "histogram range [{low}, {high}) must have low < high"
            )));
        }
        Ok(Self { num_bins, low, high })
    }

    /// Create a builder over `[low, high)` with bins of roughly `width`
    ///
    /// The bin count is `floor((high - low) / width)`, at least 1.
    pub fn with_bin_width(low: f64, high: f64, width: f64) -> Result<Self> {
        if !(width > 0.0) || !width.is_finite() {
            return Err(Error::InvalidParameter(format!("bin width {width} must be positive")));
        }
        if !(low < high) {
            return Err(Error::InvalidParameter(format!(
                "histogram range [{low}, {high}) must have low < high"
            )));
        }
        // a width wider than the range still yields one bin
        let num_bins = ((high - low) / width).floor().max(1.0);
        Self::new(num_bins as usize, low, high)
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn range(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

impl HistogramBuilder for FixedRangeBuilder {
    fn binning(&self, _sample: &WeightedSample) -> Result<(usize, f64, f64)> {
        Ok((self.num_bins, self.low, self.high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_auto_range_binning() {
        let sample = WeightedSample::unweighted(&[0.0, 5.0, 10.0]).unwrap();
        let h = AutoRangeBuilder::default().build(&sample).unwrap();

        assert_eq!(h.len(), 100);
        assert_relative_eq!(h.low(), -1.0);
        assert_relative_eq!(h.high(), 11.0);
        assert_relative_eq!(h.integral(), 3.0);
        assert_relative_eq!(h.mean(), 5.0);
    }

    #[test]
    fn test_auto_range_zero_span() {
        let sample = WeightedSample::unweighted(&[2.0, 2.0]).unwrap();
        let h = AutoRangeBuilder::new(10).build(&sample).unwrap();
        assert_eq!(h.len(), 10);
        assert_relative_eq!(h.low(), 1.5);
        assert_relative_eq!(h.high(), 2.5);
        assert_relative_eq!(h.mean(), 2.0);
    }

    #[test]
    fn test_filtered_build_keeps_binning() {
        let sample = WeightedSample::new(&[0.0, 1.0, 2.0, 10.0], &[1.0, 2.0, 1.0, 5.0]).unwrap();
        let builder = AutoRangeBuilder::default();
        let full = builder.build(&sample).unwrap();
        let trimmed = builder.build_filtered(&sample, &|x| x < 5.0).unwrap();

        assert_eq!(full.low(), trimmed.low());
        assert_eq!(full.high(), trimmed.high());
        assert_relative_eq!(trimmed.integral(), 4.0);
        assert_relative_eq!(trimmed.mean(), 1.0);
    }

    #[test]
    fn test_fixed_range_from_width() {
        let builder = FixedRangeBuilder::with_bin_width(0.5, 1.5, 0.01).unwrap();
        assert!(builder.num_bins() == 99 || builder.num_bins() == 100);

        let builder = FixedRangeBuilder::with_bin_width(0.0, 1.0, 0.25).unwrap();
        assert_eq!(builder.num_bins(), 4);

        assert_eq!(FixedRangeBuilder::with_bin_width(0.0, 1.0, 2.0).unwrap().num_bins(), 1);
        assert!(FixedRangeBuilder::with_bin_width(0.0, 1.0, 0.0).is_err());
        assert!(FixedRangeBuilder::new(10, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_fixed_range_drops_out_of_range() {
        let sample = WeightedSample::unweighted(&[0.1, 0.2, 3.0]).unwrap();
        let h = FixedRangeBuilder::new(10, 0.0, 1.0).unwrap().build(&sample).unwrap();
        assert_relative_eq!(h.integral(), 2.0);
        assert_relative_eq!(h.overflow(), 1.0);
    }
}
