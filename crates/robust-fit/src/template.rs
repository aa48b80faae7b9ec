//! A binned distribution exposed as a continuous, rescalable model

use crate::function::ModelFunction;
use robust_histogram::{BinnedDistribution, HistogramOps};

/// Value returned outside the template's domain
pub const TEMPLATE_FLOOR: f64 = 1e-10;

/// Template model built from a reference distribution
///
/// Parameters are `[Norm, ScaleFactor, Offset]` and the model is
///
/// ```text
/// f(x) = Norm * ScaleFactor * t(ScaleFactor * (x - Offset))
/// ```
///
/// where `t` linearly interpolates the template between bin centers. The
/// extra `ScaleFactor` keeps the integral invariant when the domain is
/// stretched. Outside the template's range the model is `TEMPLATE_FLOOR`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFunction {
    template: BinnedDistribution,
}

impl TemplateFunction {
    pub const NORM: usize = 0;
    pub const SCALE_FACTOR: usize = 1;
    pub const OFFSET: usize = 2;

    pub fn new(template: BinnedDistribution) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &BinnedDistribution {
        &self.template
    }

    pub fn into_template(self) -> BinnedDistribution {
        self.template
    }
}

impl ModelFunction for TemplateFunction {
    fn n_params(&self) -> usize {
        3
    }

    fn parameter_names(&self) -> Vec<&'static str> {
        vec!["Norm", "ScaleFactor", "Offset"]
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        let (norm, k, offset) = (params[0], params[1], params[2]);
        match self.template.interpolate(k * (x - offset)) {
            Some(y) => norm * k * y,
            None => TEMPLATE_FLOOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_top() -> BinnedDistribution {
        let mut h = BinnedDistribution::new(4, 0.0, 2.0).unwrap();
        for (i, w) in [1.0, 3.0, 3.0, 1.0].into_iter().enumerate() {
            h.fill_weighted(0.25 + 0.5 * i as f64, w);
        }
        h
    }

    #[test]
    fn test_identity_parameters_reproduce_template() {
        let f = TemplateFunction::new(flat_top());
        let p = [1.0, 1.0, 0.0];
        assert_relative_eq!(f.eval(0.75, &p), 3.0);
        assert_relative_eq!(f.eval(0.5, &p), 2.0);
        assert_eq!(f.eval(2.5, &p), TEMPLATE_FLOOR);
    }

    #[test]
    fn test_scale_factor_stretches_domain() {
        let f = TemplateFunction::new(flat_top());
        // k = 0.5 reads the template at x / 2 and halves the height
        let p = [1.0, 0.5, 0.0];
        assert_relative_eq!(f.eval(1.5, &p), 0.5 * 3.0);
        assert_relative_eq!(f.eval(3.9, &p), 0.5 * 1.0);
    }

    #[test]
    fn test_norm_and_offset() {
        let f = TemplateFunction::new(flat_top());
        let p = [2.0, 1.0, 1.0];
        assert_relative_eq!(f.eval(1.75, &p), 2.0 * 3.0);
        assert_eq!(f.eval(0.5, &p), TEMPLATE_FLOOR);
    }
}
