//! Core traits for building binned distributions

use crate::types::BinnedDistribution;
use robust_core::{Result, WeightedSample};

/// Trait for building binned distributions from weighted samples
pub trait HistogramBuilder {
    /// Decide the binning `(bins, low, high)` for the given sample
    fn binning(&self, sample: &WeightedSample) -> Result<(usize, f64, f64)>;

    /// Build an empty distribution with this builder's binning
    fn empty(&self, sample: &WeightedSample) -> Result<BinnedDistribution> {
        let (bins, low, high) = self.binning(sample)?;
        BinnedDistribution::new(bins, low, high)
    }

    /// Build a distribution filled with every observation of the sample
    fn build(&self, sample: &WeightedSample) -> Result<BinnedDistribution> {
        self.build_filtered(sample, &|_| true)
    }

    /// Build a distribution filled only with the observations whose
    /// value satisfies `keep`
    ///
    /// The binning is always decided from the full sample.
    fn build_filtered(
        &self,
        sample: &WeightedSample,
        keep: &dyn Fn(f64) -> bool,
    ) -> Result<BinnedDistribution> {
        let mut distribution = self.empty(sample)?;
        for obs in sample.iter().filter(|o| keep(o.value)) {
            distribution.fill_weighted(obs.value, obs.weight);
        }
        Ok(distribution)
    }
}
