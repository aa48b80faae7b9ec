//! Template scale fit
//!
//! The reference distribution is normalized to the observed one and
//! exposed as a continuous model `k * t(k * x)`. Fitting `k` to the
//! observed distribution measures how much the reference domain has to be
//! stretched; the calibration scale is `1 / k`.

use crate::traits::TemplateEstimator;
use crate::types::TemplateFitResult;
use robust_core::{Error, Result};
use robust_fit::{FitMethod, FitModel, Fitter, FitterConfig, Minimizer, TemplateFunction};
use robust_histogram::{BinnedDistribution, HistogramOps};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Parameters for [`TemplateScaleFit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateFitParameters {
    pub fit_range: (f64, f64),
    /// Starting value of the stretch factor `k`
    pub seed: f64,
    /// Additional attempts after a non-converged first fit
    pub max_retries: usize,
    pub fitter: FitterConfig,
}

impl Default for TemplateFitParameters {
    fn default() -> Self {
        Self {
            fit_range: (0.9, 1.1),
            seed: 0.99,
            max_retries: 10,
            fitter: FitterConfig::default()
                .with_minimizer(Minimizer::GaussNewton)
                .with_method(FitMethod::Likelihood),
        }
    }
}

impl TemplateFitParameters {
    pub fn with_fit_range(mut self, low: f64, high: f64) -> Self {
        self.fit_range = (low, high);
        self
    }

    pub fn with_seed(mut self, seed: f64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_fitter(mut self, fitter: FitterConfig) -> Self {
        self.fitter = fitter;
        self
    }
}

/// Fit of a single domain stretch between a reference and an observed distribution
#[derive(Debug, Clone, Default)]
pub struct TemplateScaleFit {
    params: TemplateFitParameters,
}

impl TemplateScaleFit {
    pub fn new(params: TemplateFitParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &TemplateFitParameters {
        &self.params
    }
}

impl TemplateEstimator for TemplateScaleFit {
    type Output = TemplateFitResult;

    #[instrument(skip(self, reference, observed), fields(fit_range = ?self.params.fit_range))]
    fn estimate_template(
        &self,
        reference: &BinnedDistribution,
        observed: &BinnedDistribution,
    ) -> Result<TemplateFitResult> {
        let p = &self.params;
        let norm = observed.normalization_factor(reference)?;
        let template = reference.scaled(norm);
        debug!(norm, "Normalized reference to observed");

        let mut model = FitModel::new("template", TemplateFunction::new(template), p.fit_range.0, p.fit_range.1)?;
        model
            .fix_parameter(TemplateFunction::NORM, 1.0)
            .set_parameter(TemplateFunction::SCALE_FACTOR, p.seed)
            .fix_parameter(TemplateFunction::OFFSET, 0.0);

        let fitter = Fitter::new(p.fitter);
        let mut fit = fitter.fit(&mut model, observed)?;
        let mut attempts = 1;
        // retries continue from the parameters the previous attempt left
        while !fit.is_converged() && attempts <= p.max_retries {
            debug!(attempts, status = %fit.status, "Retrying template fit");
            fit = fitter.fit(&mut model, observed)?;
            attempts += 1;
        }
        if !fit.is_converged() {
            warn!(attempts, status = %fit.status, "Template fit did not converge");
        }

        let k = model.parameter(TemplateFunction::SCALE_FACTOR);
        let k_err = model.parameter_error(TemplateFunction::SCALE_FACTOR);
        if !k.is_finite() || k == 0.0 {
            return Err(Error::Computation(format!(
                "fitted stretch factor {k} cannot be inverted"
            )));
        }
        let result = TemplateFitResult {
            scale: 1.0 / k,
            scale_err: k_err / (k * k),
            status: fit.status,
            attempts,
            template: model.into_function().into_template(),
        };
        debug!(%result, "Template fit finished");
        Ok(result)
    }

    fn name(&self) -> &str {
        "Template Scale Fit"
    }
}
