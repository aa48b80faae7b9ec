//! Result types shared by the estimators

use robust_core::{Error, Result};
use robust_fit::{FitModel, FitStatus, GaussianPeak};
use robust_histogram::BinnedDistribution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A location estimate with its statistical uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    pub mean: f64,
    /// Standard error of the weighted mean, or a fitted parameter error
    pub mean_err: f64,
}

impl PointEstimate {
    pub fn new(mean: f64, mean_err: f64) -> Self {
        Self { mean, mean_err }
    }

    /// Weighted mean and its standard error from a binned distribution
    pub fn from_distribution(distribution: &BinnedDistribution) -> Result<Self> {
        let integral = distribution.integral();
        if !(integral > 0.0) {
            return Err(Error::DegenerateInput(format!(
                "cannot estimate a mean from a distribution with integral {integral}"
            )));
        }
        let mean = distribution.mean();
        if !mean.is_finite() {
            return Err(Error::non_finite("distribution mean"));
        }
        Ok(Self::new(mean, distribution.mean_error()))
    }
}

impl fmt::Display for PointEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} +- {:.6}", self.mean, self.mean_err)
    }
}

/// Boundaries of a selected shortest interval, `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalResult {
    pub min: f64,
    pub max: f64,
}

impl IntervalResult {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Check if a value lies inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for IntervalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.min, self.max)
    }
}

/// Mean of the points inside a shortest interval, with the interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalEstimate {
    pub estimate: PointEstimate,
    pub interval: IntervalResult,
}

impl fmt::Display for IntervalEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.estimate, self.interval)
    }
}

/// Outcome of the recursive trimmed mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecursiveMeanResult {
    pub estimate: PointEstimate,
    /// Number of trimming passes, including the converged one
    pub iterations: usize,
}

impl fmt::Display for RecursiveMeanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} iterations", self.estimate, self.iterations)
    }
}

/// What one stage of the staged peak fit produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub domain: (f64, f64),
    pub mean: f64,
    pub sigma: f64,
    pub status: FitStatus,
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}]: mean {:.6}, sigma {:.6}, {}",
            self.domain.0, self.domain.1, self.mean, self.sigma, self.status
        )
    }
}

/// Outcome of the staged peak fit
///
/// The caller owns the final-stage model.
#[derive(Debug, Clone)]
pub struct PeakFitResult {
    pub estimate: PointEstimate,
    pub model: FitModel<GaussianPeak>,
    pub stages: [StageReport; 3],
}

impl PeakFitResult {
    pub fn all_converged(&self) -> bool {
        self.stages.iter().all(|s| s.status.is_converged())
    }
}

impl fmt::Display for PeakFitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "peak fit '{}': {}", self.model.name(), self.estimate)?;
        for (i, stage) in self.stages.iter().enumerate() {
            writeln!(f, "  stage {}: {stage}", i + 1)?;
        }
        Ok(())
    }
}

/// Outcome of the template scale fit
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFitResult {
    /// `1 / k` for the fitted stretch factor `k`
    pub scale: f64,
    /// `err(k) / k^2`
    pub scale_err: f64,
    /// Status of the last attempt
    pub status: FitStatus,
    /// Total number of fit attempts made
    pub attempts: usize,
    /// The reference distribution normalized to the observed one
    pub template: BinnedDistribution,
}

impl TemplateFitResult {
    pub fn converged(&self) -> bool {
        self.status.is_converged()
    }
}

impl fmt::Display for TemplateFitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scale {:.6} +- {:.6} ({}, {} attempts)",
            self.scale, self.scale_err, self.status, self.attempts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_result() {
        let interval = IntervalResult::new(0.95, 1.05);
        assert!((interval.width() - 0.1).abs() < 1e-12);
        assert!(interval.contains(1.0));
        assert!(interval.contains(0.95));
        assert!(!interval.contains(1.2));
        assert_eq!(interval.to_string(), "[0.950000, 1.050000]");
    }

    #[test]
    fn test_point_estimate_from_distribution() {
        let mut h = BinnedDistribution::new(10, 0.0, 2.0).unwrap();
        h.fill_weighted(0.9, 1.0);
        h.fill_weighted(1.1, 1.0);
        let estimate = PointEstimate::from_distribution(&h).unwrap();
        assert!((estimate.mean - 1.0).abs() < 1e-12);
        assert!((estimate.mean_err - 0.1 / 2f64.sqrt()).abs() < 1e-12);

        let empty = h.cleared();
        let err = PointEstimate::from_distribution(&empty).unwrap_err();
        assert!(err.is_degenerate());
    }
}
