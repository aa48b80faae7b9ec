//! Fitter configuration
//!
//! The choice of minimizer is an explicit value handed to each fit rather
//! than a process-wide default, so concurrent or repeated fits are
//! independent of each other.

use serde::{Deserialize, Serialize};

/// Minimization algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Minimizer {
    /// Gauss-Newton on the residual vector with a backtracking
    /// (Armijo) line search
    #[default]
    GaussNewton,
    /// L-BFGS on the summed objective with a More-Thuente line search
    QuasiNewton,
}

/// Objective minimized over the selected bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitMethod {
    /// Neyman chi-square with bin errors from the squared weights;
    /// empty bins are skipped
    #[default]
    ChiSquare,
    /// Baker-Cousins Poisson likelihood deviance over all selected bins,
    /// with contents rescaled to effective entries for weighted fills
    Likelihood,
}

/// Configuration for [`crate::Fitter`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitterConfig {
    pub minimizer: Minimizer,
    pub method: FitMethod,
    /// Maximum number of minimizer iterations per fit
    pub max_iterations: usize,
    /// Convergence threshold on the estimated distance to minimum
    pub tolerance: f64,
    /// Only use bins whose centers fall inside the model's domain
    pub restrict_to_domain: bool,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            minimizer: Minimizer::default(),
            method: FitMethod::default(),
            max_iterations: 500,
            tolerance: 1e-7,
            restrict_to_domain: true,
        }
    }
}

impl FitterConfig {
    pub fn with_minimizer(mut self, minimizer: Minimizer) -> Self {
        self.minimizer = minimizer;
        self
    }

    pub fn with_method(mut self, method: FitMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_restrict_to_domain(mut self, restrict: bool) -> Self {
        self.restrict_to_domain = restrict;
        self
    }
}
