//! Staged Gaussian peak fit
//!
//! A single unconstrained fit of a narrow peak to noisy weighted data can
//! run away or lock onto the wrong structure, so the fit is done in three
//! passes over a normalized distribution, each seeded by the previous one:
//!
//! 1. Amplitude fixed at the distribution maximum, mean fixed at the
//!    starting mean, width free within `[0, 1]`, over a wide fixed window.
//! 2. Mean still fixed, amplitude and width free within `[0, 1]`, over
//!    `starting_mean ± 1.5 sigma`.
//! 3. Everything free within bounds over `mean ± sigma`. The mean and its
//!    fitted error are the result.

use crate::types::{PeakFitResult, PointEstimate, StageReport};
use robust_core::{Error, Result, WeightedEstimator, WeightedSample};
use robust_fit::{FitMethod, FitModel, Fitter, FitterConfig, GaussianPeak, Minimizer};
use robust_histogram::{fixed_histogram, BinnedDistribution};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Seed amplitude for stages 2 and 3
const AMPLITUDE_SEED: f64 = 0.1;

/// Parameters for [`StagedPeakFit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakFitParameters {
    pub num_bins: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Expected peak position, held fixed in the first two stages
    pub starting_mean: f64,
    /// Name of the final-stage model handed back to the caller
    pub name: String,
    pub stage_one_window: (f64, f64),
    /// Stage 2 half width in units of the stage 1 sigma
    pub stage_two_width: f64,
    /// Bounds of the mean in stage 3
    pub mean_bounds: (f64, f64),
    /// Bounds of amplitude and sigma in every stage
    pub shape_bounds: (f64, f64),
    pub fitter: FitterConfig,
}

impl Default for PeakFitParameters {
    fn default() -> Self {
        Self {
            num_bins: 200,
            x_min: 0.5,
            x_max: 1.5,
            starting_mean: 1.0,
            name: "gausFit".to_string(),
            stage_one_window: (0.75, 1.25),
            stage_two_width: 1.5,
            mean_bounds: (0.5, 1.5),
            shape_bounds: (0.0, 1.0),
            fitter: FitterConfig::default()
                .with_minimizer(Minimizer::GaussNewton)
                .with_method(FitMethod::Likelihood),
        }
    }
}

impl PeakFitParameters {
    /// Default parameters with the given binning
    pub fn new(num_bins: usize, x_min: f64, x_max: f64) -> Self {
        Self {
            num_bins,
            x_min,
            x_max,
            ..Self::default()
        }
    }

    pub fn with_starting_mean(mut self, starting_mean: f64) -> Self {
        self.starting_mean = starting_mean;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stage_one_window(mut self, low: f64, high: f64) -> Self {
        self.stage_one_window = (low, high);
        self
    }

    pub fn with_fitter(mut self, fitter: FitterConfig) -> Self {
        self.fitter = fitter;
        self
    }
}

/// Three-stage constrained Gaussian fit
#[derive(Debug, Clone, Default)]
pub struct StagedPeakFit {
    params: PeakFitParameters,
}

impl StagedPeakFit {
    pub fn new(params: PeakFitParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &PeakFitParameters {
        &self.params
    }

    fn run_stage(
        &self,
        stage: usize,
        model: &mut FitModel<GaussianPeak>,
        distribution: &BinnedDistribution,
        fitter: &Fitter,
    ) -> Result<StageReport> {
        let fit = fitter.fit(model, distribution)?;
        let report = StageReport {
            domain: model.domain(),
            mean: model.parameter(GaussianPeak::MEAN),
            sigma: model.parameter(GaussianPeak::SIGMA),
            status: fit.status,
        };
        if fit.is_converged() {
            debug!(stage, %report, reduced_objective = fit.reduced_objective(), "Stage finished");
        } else {
            warn!(stage, %report, n_points = fit.n_points, "Peak fit stage did not converge");
        }
        if !(report.sigma > 0.0) {
            return Err(Error::DegenerateInput(format!(
                "stage {stage} width collapsed to {}",
                report.sigma
            )));
        }
        Ok(report)
    }
}

impl WeightedEstimator for StagedPeakFit {
    type Output = PeakFitResult;

    #[instrument(skip(self, sample), fields(n = sample.len(), starting_mean = self.params.starting_mean))]
    fn estimate(&self, sample: &WeightedSample) -> Result<PeakFitResult> {
        let p = &self.params;
        let (shape_lo, shape_hi) = p.shape_bounds;
        let distribution = fixed_histogram(sample, p.num_bins, p.x_min, p.x_max)?.normalized()?;
        let fitter = Fitter::new(p.fitter);

        let peak = distribution.maximum();
        let mut first = FitModel::new("stage1", GaussianPeak, p.stage_one_window.0, p.stage_one_window.1)?;
        first
            .set_parameters(&[peak, p.starting_mean, distribution.rms()])
            .fix_parameter(GaussianPeak::AMPLITUDE, peak)
            .fix_parameter(GaussianPeak::MEAN, p.starting_mean)
            .set_parameter_bounds(GaussianPeak::SIGMA, shape_lo, shape_hi)?;
        let stage1 = self.run_stage(1, &mut first, &distribution, &fitter)?;

        let half_width = p.stage_two_width * stage1.sigma;
        let mut second = FitModel::new(
            "stage2",
            GaussianPeak,
            p.starting_mean - half_width,
            p.starting_mean + half_width,
        )?;
        second
            .set_parameters(&[AMPLITUDE_SEED, stage1.mean, stage1.sigma])
            .fix_parameter(GaussianPeak::MEAN, p.starting_mean)
            .set_parameter_bounds(GaussianPeak::AMPLITUDE, shape_lo, shape_hi)?
            .set_parameter_bounds(GaussianPeak::SIGMA, shape_lo, shape_hi)?;
        let stage2 = self.run_stage(2, &mut second, &distribution, &fitter)?;

        let mut model = FitModel::new(
            p.name.clone(),
            GaussianPeak,
            stage2.mean - stage2.sigma,
            stage2.mean + stage2.sigma,
        )?;
        model
            .set_parameters(&[AMPLITUDE_SEED, stage2.mean, stage2.sigma])
            .set_parameter_bounds(GaussianPeak::AMPLITUDE, shape_lo, shape_hi)?
            .set_parameter_bounds(GaussianPeak::MEAN, p.mean_bounds.0, p.mean_bounds.1)?
            .set_parameter_bounds(GaussianPeak::SIGMA, shape_lo, shape_hi)?;
        let stage3 = self.run_stage(3, &mut model, &distribution, &fitter)?;

        let estimate = PointEstimate::new(stage3.mean, model.parameter_error(GaussianPeak::MEAN));
        Ok(PeakFitResult {
            estimate,
            model,
            stages: [stage1, stage2, stage3],
        })
    }

    fn name(&self) -> &str {
        "Staged Peak Fit"
    }
}
