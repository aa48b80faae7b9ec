//! Parametric model functions

/// A scalar function of one variable with a fixed number of parameters
pub trait ModelFunction {
    /// Number of parameters the function takes
    fn n_params(&self) -> usize;

    /// Default parameter names, one per parameter
    fn parameter_names(&self) -> Vec<&'static str>;

    /// Evaluate the function at `x`
    ///
    /// `params` always has exactly `n_params()` elements.
    fn eval(&self, x: f64, params: &[f64]) -> f64;
}

/// Single symmetric peak `A * exp(-(x - mu)^2 / (2 sigma^2))`
///
/// Parameters are `[Amplitude, Mean, Sigma]`. A zero width evaluates to zero
/// everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaussianPeak;

impl GaussianPeak {
    pub const AMPLITUDE: usize = 0;
    pub const MEAN: usize = 1;
    pub const SIGMA: usize = 2;
}

impl ModelFunction for GaussianPeak {
    fn n_params(&self) -> usize {
        3
    }

    fn parameter_names(&self) -> Vec<&'static str> {
        vec!["Amplitude", "Mean", "Sigma"]
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        let (amplitude, mean, sigma) = (params[0], params[1], params[2]);
        if sigma == 0.0 {
            return 0.0;
        }
        let z = (x - mean) / sigma;
        amplitude * (-0.5 * z * z).exp()
    }
}
