//! Recursive trimmed mean
//!
//! Starting from `initial_mean`, every pass keeps only the observations
//! within a window of the current estimate and recomputes the weighted
//! mean. The first pass uses a window `first_pass_factor` times wider to
//! find the right neighbourhood; later passes use the nominal window. The
//! loop stops as soon as the mean moves by no more than `tolerance`.

use crate::types::{PointEstimate, RecursiveMeanResult};
use robust_core::{Error, Result, WeightedEstimator, WeightedSample};
use robust_histogram::{AutoRangeBuilder, HistogramBuilder, DEFAULT_BINS, DEFAULT_PADDING};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Parameters for [`RecursiveMean`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecursiveMeanParameters {
    /// Half width of the trimming window
    pub window: f64,
    /// Largest change of the mean accepted as converged
    pub tolerance: f64,
    pub max_iterations: usize,
    pub initial_mean: f64,
    /// Window multiplier for the first pass
    pub first_pass_factor: f64,
    pub num_bins: usize,
    pub padding: f64,
}

impl Default for RecursiveMeanParameters {
    fn default() -> Self {
        Self {
            window: 0.1,
            tolerance: 1e-4,
            max_iterations: 1000,
            initial_mean: 1.0,
            first_pass_factor: 2.0,
            num_bins: DEFAULT_BINS,
            padding: DEFAULT_PADDING,
        }
    }
}

impl RecursiveMeanParameters {
    /// Default parameters with the given window and tolerance
    pub fn new(window: f64, tolerance: f64) -> Self {
        Self {
            window,
            tolerance,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_initial_mean(mut self, initial_mean: f64) -> Self {
        self.initial_mean = initial_mean;
        self
    }

    pub fn with_first_pass_factor(mut self, factor: f64) -> Self {
        self.first_pass_factor = factor;
        self
    }

    pub fn with_num_bins(mut self, num_bins: usize) -> Self {
        self.num_bins = num_bins;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.window > 0.0) || !self.window.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "window {} must be positive",
                self.window
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "tolerance {} must be positive",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.first_pass_factor > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "first pass factor {} must be positive",
                self.first_pass_factor
            )));
        }
        if !self.initial_mean.is_finite() {
            return Err(Error::non_finite("initial mean"));
        }
        Ok(())
    }
}

/// Iteratively re-centred trimmed mean
#[derive(Debug, Clone, Default)]
pub struct RecursiveMean {
    params: RecursiveMeanParameters,
}

impl RecursiveMean {
    pub fn new(params: RecursiveMeanParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &RecursiveMeanParameters {
        &self.params
    }
}

impl WeightedEstimator for RecursiveMean {
    type Output = RecursiveMeanResult;

    #[instrument(skip(self, sample), fields(n = sample.len(), window = self.params.window))]
    fn estimate(&self, sample: &WeightedSample) -> Result<RecursiveMeanResult> {
        let p = &self.params;
        p.validate()?;
        let builder = AutoRangeBuilder::new(p.num_bins).with_padding(p.padding);

        let mut center = p.initial_mean;
        let mut last_delta = f64::INFINITY;
        for trial in 0..p.max_iterations {
            let half_width = if trial == 0 {
                p.first_pass_factor * p.window
            } else {
                p.window
            };
            let distribution = builder.build_filtered(sample, &|x| (x - center).abs() <= half_width)?;
            if !(distribution.integral() > 0.0) {
                return Err(Error::DegenerateInput(format!(
                    "no weight within {half_width} of {center}"
                )));
            }

            let estimate = PointEstimate::from_distribution(&distribution)?;
            let delta = (estimate.mean - center).abs();
            debug!(trial, mean = estimate.mean, delta, "Trimmed pass");
            if delta <= p.tolerance {
                return Ok(RecursiveMeanResult {
                    estimate,
                    iterations: trial + 1,
                });
            }
            center = estimate.mean;
            last_delta = delta;
        }

        Err(Error::DidNotConverge {
            iterations: p.max_iterations,
            last_delta,
        })
    }

    fn name(&self) -> &str {
        "Recursive Mean"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn symmetric(center: f64) -> WeightedSample {
        let mut values = Vec::new();
        for i in 1..=50 {
            let d = 0.002 * i as f64;
            values.push(center - d);
            values.push(center + d);
        }
        // outliers on one side only
        values.extend([center + 1.0, center + 1.5]);
        WeightedSample::unweighted(&values).unwrap()
    }

    #[test]
    fn test_trims_one_sided_outliers() {
        let sample = symmetric(1.02);
        let result = RecursiveMean::new(RecursiveMeanParameters::new(0.2, 1e-6))
            .estimate(&sample)
            .unwrap();
        assert_relative_eq!(result.estimate.mean, 1.02, epsilon = 1e-6);
        assert!(result.iterations >= 2);
    }

    #[test]
    fn test_first_pass_uses_wider_window() {
        // only reachable from 1.0 through the doubled window
        let sample = WeightedSample::unweighted(&[1.15, 1.16, 1.17]).unwrap();
        let narrow = RecursiveMeanParameters::new(0.1, 1e-6).with_first_pass_factor(1.0);
        assert!(RecursiveMean::new(narrow).estimate(&sample).unwrap_err().is_degenerate());

        let result = RecursiveMean::new(RecursiveMeanParameters::new(0.1, 1e-6))
            .estimate(&sample)
            .unwrap();
        assert_relative_eq!(result.estimate.mean, 1.16, epsilon = 1e-9);
    }

    #[test]
    fn test_window_edge_is_inclusive() {
        // 0.75 and 1.25 sit exactly on the window edges, 1.26 just outside
        let sample = WeightedSample::unweighted(&[0.75, 1.25, 1.26]).unwrap();
        let params = RecursiveMeanParameters::new(0.25, 1e-2).with_first_pass_factor(1.0);
        let result = RecursiveMean::new(params).estimate(&sample).unwrap();

        assert_eq!(result.iterations, 1);
        assert_relative_eq!(result.estimate.mean, 1.0, epsilon = 0.01);
    }

    #[test]
    fn test_iteration_cap() {
        let sample = symmetric(1.3);
        let params = RecursiveMeanParameters::new(0.2, 1e-9).with_max_iterations(1);
        match RecursiveMean::new(params).estimate(&sample) {
            Err(Error::DidNotConverge { iterations, last_delta }) => {
                assert_eq!(iterations, 1);
                assert!(last_delta > 1e-9);
            }
            other => panic!("expected DidNotConverge, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let sample = symmetric(1.0);
        for params in [
            RecursiveMeanParameters::new(0.0, 1e-3),
            RecursiveMeanParameters::new(0.1, 0.0),
            RecursiveMeanParameters::new(0.1, 1e-3).with_max_iterations(0),
        ] {
            let err = RecursiveMean::new(params).estimate(&sample).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)));
        }
    }
}
