//! Plain weighted mean over an auto-ranged distribution

use crate::types::PointEstimate;
use robust_core::{Result, WeightedEstimator, WeightedSample};
use robust_histogram::{AutoRangeBuilder, HistogramBuilder};
use tracing::{debug, instrument};

/// Weighted mean and standard error of every observation
///
/// No trimming and no iteration; the baseline the other estimators are
/// compared against.
#[derive(Debug, Clone, Default)]
pub struct PlainMean {
    builder: AutoRangeBuilder,
}

impl PlainMean {
    pub fn new(builder: AutoRangeBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &AutoRangeBuilder {
        &self.builder
    }
}

impl WeightedEstimator for PlainMean {
    type Output = PointEstimate;

    #[instrument(skip(self, sample), fields(n = sample.len()))]
    fn estimate(&self, sample: &WeightedSample) -> Result<PointEstimate> {
        let distribution = self.builder.build(sample)?;
        let estimate = PointEstimate::from_distribution(&distribution)?;
        debug!(%estimate, "Plain mean");
        Ok(estimate)
    }

    fn name(&self) -> &str {
        "Plain Mean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_weights_match_arithmetic_mean() {
        let values = [0.97, 1.01, 1.02, 0.99, 1.05, 1.0];
        let sample = WeightedSample::unweighted(&values).unwrap();
        let estimate = PlainMean::default().estimate(&sample).unwrap();

        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert_relative_eq!(estimate.mean, expected, epsilon = 1e-12);
        assert!(estimate.mean_err > 0.0);
    }

    #[test]
    fn test_weights_pull_the_mean() {
        let sample = WeightedSample::new(&[1.0, 2.0], &[3.0, 1.0]).unwrap();
        let estimate = PlainMean::default().estimate(&sample).unwrap();
        assert_relative_eq!(estimate.mean, 1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_weights_are_degenerate() {
        let sample = WeightedSample::new(&[1.0, 2.0], &[0.0, 0.0]).unwrap();
        let err = PlainMean::default().estimate(&sample).unwrap_err();
        assert!(err.is_degenerate());
    }
}
