//! Estimator traits for binned inputs

use robust_core::Result;
use robust_histogram::BinnedDistribution;

/// An estimator that works on an already binned distribution
pub trait BinnedEstimator {
    type Output;

    fn estimate_binned(&self, distribution: &BinnedDistribution) -> Result<Self::Output>;

    fn name(&self) -> &str;
}

/// An estimator that compares an observed distribution against a reference
pub trait TemplateEstimator {
    type Output;

    /// Estimate from a `reference` shape and an `observed` distribution
    ///
    /// Neither input is modified.
    fn estimate_template(
        &self,
        reference: &BinnedDistribution,
        observed: &BinnedDistribution,
    ) -> Result<Self::Output>;

    fn name(&self) -> &str;
}
