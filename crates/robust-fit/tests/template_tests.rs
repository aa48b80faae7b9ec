//! Fits of rescaled templates against sampled distributions

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use robust_fit::{FitMethod, FitModel, Fitter, FitterConfig, Minimizer, TemplateFunction};
use robust_histogram::BinnedDistribution;

fn sampled(mean: f64, sigma: f64, n: usize, seed: u64) -> BinnedDistribution {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(mean, sigma).unwrap();
    let mut h = BinnedDistribution::new(200, 0.5, 1.5).unwrap();
    for _ in 0..n {
        h.fill(normal.sample(&mut rng));
    }
    h
}

fn template_model(reference: BinnedDistribution, observed: &BinnedDistribution) -> FitModel<TemplateFunction> {
    let norm = observed.integral() / reference.integral();
    let mut model = FitModel::new("template", TemplateFunction::new(reference.scaled(norm)), 0.9, 1.1).unwrap();
    model
        .fix_parameter(TemplateFunction::NORM, 1.0)
        .set_parameter(TemplateFunction::SCALE_FACTOR, 0.99)
        .fix_parameter(TemplateFunction::OFFSET, 0.0);
    model
}

#[test]
fn test_recovers_stretch_factor() {
    let reference = sampled(1.0, 0.05, 200_000, 1);
    // 1.02 times the reference distribution
    let observed = sampled(1.02, 0.051, 50_000, 2);

    let mut model = template_model(reference, &observed);
    let config = FitterConfig::default()
        .with_minimizer(Minimizer::GaussNewton)
        .with_method(FitMethod::Likelihood);
    let result = Fitter::new(config).fit(&mut model, &observed).unwrap();

    assert!(result.is_converged(), "{result}");
    let k = model.parameter(TemplateFunction::SCALE_FACTOR);
    assert_relative_eq!(1.0 / k, 1.02, epsilon = 0.004);
    assert!(model.parameter_error(TemplateFunction::SCALE_FACTOR) > 0.0);
    assert_eq!(model.parameter(TemplateFunction::NORM), 1.0);
}

#[test]
fn test_identical_distributions_give_unit_factor() {
    let reference = sampled(1.0, 0.04, 100_000, 5);
    let observed = reference.clone();

    let mut model = template_model(reference, &observed);
    let result = Fitter::default().fit(&mut model, &observed).unwrap();

    assert!(result.is_converged(), "{result}");
    assert_relative_eq!(model.parameter(TemplateFunction::SCALE_FACTOR), 1.0, epsilon = 1e-3);
}
