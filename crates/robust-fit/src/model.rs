//! Named, bounded, partially fixed fit models

use crate::function::ModelFunction;
use robust_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional limits on a parameter's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ParameterBounds {
    pub fn both(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }

    /// Clamp `value` into the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        let v = self.lower.map_or(value, |lo| value.max(lo));
        self.upper.map_or(v, |hi| v.min(hi))
    }
}

/// A single model parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    /// Fitted uncertainty; zero until a fit has run or when fixed
    pub error: f64,
    pub bounds: ParameterBounds,
    pub fixed: bool,
}

impl Parameter {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: 0.0,
            error: 0.0,
            bounds: ParameterBounds::default(),
            fixed: false,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:.6} +- {:.6}", self.name, self.value, self.error)?;
        if self.fixed {
            write!(f, " (fixed)")?;
        }
        Ok(())
    }
}

/// A model function bound to a name, a fit domain and parameter settings
///
/// Setters panic on an out-of-range parameter index, like slice indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct FitModel<F: ModelFunction> {
    name: String,
    function: F,
    domain: (f64, f64),
    params: Vec<Parameter>,
}

impl<F: ModelFunction> FitModel<F> {
    /// Create a model over the domain `[low, high]`
    pub fn new(name: impl Into<String>, function: F, low: f64, high: f64) -> Result<Self> {
        if !(low < high) {
            return Err(Error::InvalidParameter(format!(
                "fit domain [{low}, {high}] must have low < high"
            )));
        }
        let params = function
            .parameter_names()
            .into_iter()
            .take(function.n_params())
            .map(Parameter::new)
            .collect();
        Ok(Self {
            name: name.into(),
            function,
            domain: (low, high),
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> &F {
        &self.function
    }

    pub fn into_function(self) -> F {
        self.function
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn parameter_by_name(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Current value of parameter `index`
    pub fn parameter(&self, index: usize) -> f64 {
        self.params[index].value
    }

    /// Fitted error of parameter `index`
    pub fn parameter_error(&self, index: usize) -> f64 {
        self.params[index].error
    }

    /// Current values of all parameters
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value).collect()
    }

    /// Number of parameters the fitter may vary
    pub fn n_free(&self) -> usize {
        self.params.iter().filter(|p| !p.fixed).count()
    }

    /// Set the starting value of parameter `index`, clamped into its bounds
    pub fn set_parameter(&mut self, index: usize, value: f64) -> &mut Self {
        let p = &mut self.params[index];
        p.value = p.bounds.clamp(value);
        self
    }

    /// Set the starting values of all parameters at once
    pub fn set_parameters(&mut self, values: &[f64]) -> &mut Self {
        for (index, &value) in values.iter().enumerate().take(self.params.len()) {
            self.set_parameter(index, value);
        }
        self
    }

    /// Fix parameter `index` at `value`; fixed values ignore bounds
    pub fn fix_parameter(&mut self, index: usize, value: f64) -> &mut Self {
        let p = &mut self.params[index];
        p.value = value;
        p.error = 0.0;
        p.fixed = true;
        self
    }

    /// Let the fitter vary parameter `index` again
    pub fn release_parameter(&mut self, index: usize) -> &mut Self {
        self.params[index].fixed = false;
        self
    }

    /// Restrict parameter `index` to `[lower, upper]`
    pub fn set_parameter_bounds(&mut self, index: usize, lower: f64, upper: f64) -> Result<&mut Self> {
        if !(lower < upper) {
            return Err(Error::InvalidParameter(format!(
                "bounds [{lower}, {upper}] for parameter {index} must have lower < upper"
            )));
        }
        let p = &mut self.params[index];
        p.bounds = ParameterBounds::both(lower, upper);
        if !p.fixed {
            p.value = p.bounds.clamp(p.value);
        }
        Ok(self)
    }

    /// Evaluate the model at `x` with the current parameter values
    pub fn eval(&self, x: f64) -> f64 {
        self.function.eval(x, &self.values())
    }

    pub(crate) fn params_mut(&mut self) -> &mut [Parameter] {
        &mut self.params
    }
}

impl<F: ModelFunction> fmt::Display for FitModel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} on [{:.4}, {:.4}]", self.name, self.domain.0, self.domain.1)?;
        for p in &self.params {
            writeln!(f, "  {p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::GaussianPeak;

    #[test]
    fn test_model_parameters() {
        let mut model = FitModel::new("peak", GaussianPeak, 0.5, 1.5).unwrap();
        assert_eq!(model.parameters().len(), 3);
        assert_eq!(model.n_free(), 3);

        model.set_parameters(&[0.1, 1.0, 0.05]).fix_parameter(1, 1.02);
        assert_eq!(model.n_free(), 2);
        assert_eq!(model.parameter(1), 1.02);
        assert_eq!(model.parameter_by_name("Sigma").unwrap().value, 0.05);

        model.release_parameter(1);
        assert_eq!(model.n_free(), 3);
    }

    #[test]
    fn test_bounds_clamp_values() {
        let mut model = FitModel::new("peak", GaussianPeak, 0.0, 2.0).unwrap();
        model.set_parameter(2, 3.0);
        model.set_parameter_bounds(2, 0.0, 1.0).unwrap();
        assert_eq!(model.parameter(2), 1.0);

        model.set_parameter(2, -4.0);
        assert_eq!(model.parameter(2), 0.0);

        assert!(model.set_parameter_bounds(0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_invalid_domain() {
        assert!(FitModel::new("bad", GaussianPeak, 1.0, 0.5).is_err());
    }

    #[test]
    fn test_eval_and_display() {
        let mut model = FitModel::new("peak", GaussianPeak, 0.0, 2.0).unwrap();
        model.set_parameters(&[2.0, 1.0, 0.1]);
        assert_eq!(model.eval(1.0), 2.0);

        let text = model.to_string();
        assert!(text.starts_with("peak on"));
        assert!(text.contains("Mean = 1.000000"));
    }
}
