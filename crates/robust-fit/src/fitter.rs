//! Bounded nonlinear fits of models to binned distributions
//!
//! Free parameters are mapped to an unbounded internal space and the
//! selected bins are turned into a residual vector. The sum of squared
//! residuals is minimized by an `argmin` solver: Gauss-Newton with a
//! backtracking line search, or L-BFGS with a More-Thuente line search.
//! Jacobians are numeric central differences in internal space. Parameter
//! errors come from the inverse of `J^T J` at the final point, propagated
//! back to external space.

use crate::config::{FitMethod, FitterConfig, Minimizer};
use crate::function::ModelFunction;
use crate::model::{FitModel, ParameterBounds};
use crate::transform;
use argmin::core::{
    CostFunction, Executor, Gradient, Jacobian, Operator, State, TerminationReason,
    TerminationStatus,
};
use argmin::solver::gaussnewton::GaussNewtonLS;
use argmin::solver::linesearch::condition::ArmijoCondition;
use argmin::solver::linesearch::{BacktrackingLineSearch, MoreThuenteLineSearch};
use argmin::solver::quasinewton::LBFGS;
use nalgebra::{DMatrix, DVector};
use robust_core::{Error, Result};
use robust_histogram::BinnedDistribution;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

/// Smallest expected content used in the likelihood residual
const MIN_EXPECTED: f64 = 1e-300;
const SVD_EPS: f64 = 1e-12;
/// Sufficient-decrease constant of the Gauss-Newton line search
const ARMIJO_C: f64 = 1e-4;
/// Correction pairs kept by L-BFGS
const LBFGS_MEMORY: usize = 7;

/// Outcome of a single fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStatus {
    /// Estimated distance to minimum fell below the tolerance
    Converged,
    /// The normal equations could not be solved
    Singular,
    /// The minimizer stopped away from a minimum, or the fit could not
    /// start at all
    Failed,
    /// Iteration limit reached before convergence
    MaxIterations,
}

impl FitStatus {
    /// Numeric status code; zero means converged
    pub fn code(&self) -> i32 {
        match self {
            FitStatus::Converged => 0,
            FitStatus::Singular => 1,
            FitStatus::Failed => 3,
            FitStatus::MaxIterations => 4,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, FitStatus::Converged)
    }
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FitStatus::Converged => "converged",
            FitStatus::Singular => "singular",
            FitStatus::Failed => "failed",
            FitStatus::MaxIterations => "max iterations",
        };
        write!(f, "{text} ({})", self.code())
    }
}

/// Summary of a fit; fitted values and errors live on the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub status: FitStatus,
    /// Sum of squared residuals at the final point
    pub objective: f64,
    /// Estimated distance to minimum at the final point
    pub edm: f64,
    /// Number of minimizer iterations
    pub iterations: usize,
    /// Number of bins that entered the objective
    pub n_points: usize,
    /// `n_points` minus the number of free parameters
    pub ndf: usize,
}

impl FitResult {
    pub fn is_converged(&self) -> bool {
        self.status.is_converged()
    }

    /// Objective per degree of freedom, NaN when `ndf` is zero
    pub fn reduced_objective(&self) -> f64 {
        if self.ndf == 0 {
            f64::NAN
        } else {
            self.objective / self.ndf as f64
        }
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {} objective {:.4} / {} ndf, edm {:.3e}, {} iterations",
            self.status, self.objective, self.ndf, self.edm, self.iterations
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: f64,
    w2: f64,
}

struct Outcome {
    status: FitStatus,
    internal: DVector<f64>,
    objective: f64,
    edm: f64,
    iterations: usize,
    covariance: Option<DMatrix<f64>>,
}

/// Why the solver stopped
#[derive(Debug)]
enum Stop {
    Converged,
    MaxIterations,
    Other(String),
    Aborted(String),
}

impl Stop {
    fn from_status(status: &TerminationStatus) -> Self {
        match status {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
            | TerminationStatus::Terminated(TerminationReason::TargetCostReached) => Stop::Converged,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => Stop::MaxIterations,
            other => Stop::Other(other.to_string()),
        }
    }
}

/// Points an `argmin` run left behind
struct Run {
    candidates: Vec<DVector<f64>>,
    iterations: usize,
    stop: Stop,
}

impl Run {
    fn aborted(err: argmin::core::Error) -> Self {
        Self {
            candidates: Vec::new(),
            iterations: 0,
            stop: Stop::Aborted(err.to_string()),
        }
    }
}

/// Residual model for one fit
struct Problem<'a, F> {
    function: &'a F,
    method: FitMethod,
    points: Vec<Point>,
    /// Content scale that turns weighted contents into effective counts
    scale: f64,
    base: Vec<f64>,
    free: Vec<usize>,
    bounds: Vec<ParameterBounds>,
}

impl<F: ModelFunction> Problem<'_, F> {
    fn external(&self, internal: &DVector<f64>) -> Vec<f64> {
        let mut params = self.base.clone();
        for (k, &i) in self.free.iter().enumerate() {
            params[i] = transform::to_external(internal[k], &self.bounds[k]);
        }
        params
    }

    fn residuals(&self, internal: &DVector<f64>) -> DVector<f64> {
        let params = self.external(internal);
        DVector::from_iterator(
            self.points.len(),
            self.points.iter().map(|p| {
                let expected = self.function.eval(p.x, &params);
                match self.method {
                    FitMethod::ChiSquare => (p.y - expected) / p.w2.sqrt(),
                    FitMethod::Likelihood => {
                        deviance_residual(self.scale * p.y, self.scale * expected)
                    }
                }
            }),
        )
    }

    fn objective(&self, internal: &DVector<f64>) -> f64 {
        self.residuals(internal).norm_squared()
    }

    fn jacobian_at(&self, internal: &DVector<f64>) -> DMatrix<f64> {
        let mut jacobian = DMatrix::zeros(self.points.len(), internal.len());
        for j in 0..internal.len() {
            let h = 1e-6 * (1.0 + internal[j].abs());
            let mut up = internal.clone();
            up[j] += h;
            let mut down = internal.clone();
            down[j] -= h;
            let column = (self.residuals(&up) - self.residuals(&down)) / (2.0 * h);
            jacobian.set_column(j, &column);
        }
        jacobian
    }
}

/// Residual vector and Jacobian for the Gauss-Newton solver
struct LeastSquares<'p, 'a, F>(&'p Problem<'a, F>);

impl<F: ModelFunction> Operator for LeastSquares<'_, '_, F> {
    type Param = DVector<f64>;
    type Output = DVector<f64>;

    fn apply(&self, internal: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.0.residuals(internal))
    }
}

impl<F: ModelFunction> Jacobian for LeastSquares<'_, '_, F> {
    type Param = DVector<f64>;
    type Jacobian = DMatrix<f64>;

    fn jacobian(&self, internal: &Self::Param) -> std::result::Result<Self::Jacobian, argmin::core::Error> {
        Ok(self.0.jacobian_at(internal))
    }
}

/// Scalar objective and its gradient for L-BFGS
struct Objective<'p, 'a, F>(&'p Problem<'a, F>);

impl<F: ModelFunction> CostFunction for Objective<'_, '_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, internal: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.0.objective(&DVector::from_column_slice(internal)))
    }
}

impl<F: ModelFunction> Gradient for Objective<'_, '_, F> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, internal: &Self::Param) -> std::result::Result<Self::Gradient, argmin::core::Error> {
        let x = DVector::from_column_slice(internal);
        let gradient = self.0.jacobian_at(&x).transpose() * self.0.residuals(&x) * 2.0;
        Ok(gradient.iter().copied().collect())
    }
}

/// Signed square root of the Poisson deviance contribution of one bin
fn deviance_residual(observed: f64, expected: f64) -> f64 {
    let y = observed.max(0.0);
    let f = expected.max(MIN_EXPECTED);
    let deviance = if y > 0.0 {
        2.0 * (f - y + y * (y / f).ln())
    } else {
        2.0 * f
    };
    deviance.max(0.0).sqrt().copysign(y - f)
}

/// Solve a symmetric system, falling back to SVD when it is not positive definite
fn solve(matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = matrix.clone().cholesky() {
        return Some(chol.solve(rhs));
    }
    let svd = matrix.clone().svd(true, true);
    let max_singular = svd.singular_values.max();
    if !(max_singular > 0.0) {
        return None;
    }
    svd.solve(rhs, SVD_EPS * max_singular)
        .ok()
        .filter(|x| x.iter().all(|v| v.is_finite()))
}

fn invert(matrix: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    match matrix.clone().cholesky() {
        Some(chol) => Some(chol.inverse()),
        None => matrix.clone().pseudo_inverse(SVD_EPS).ok(),
    }
}

/// External error of a free parameter; NaN when it sits on a bound
fn external_error(variance: f64, internal: f64, bounds: &ParameterBounds) -> f64 {
    if transform::at_limit(internal, bounds) {
        return f64::NAN;
    }
    variance.max(0.0).sqrt() * transform::derivative(internal, bounds).abs()
}

fn solver_setup(err: argmin::core::Error) -> Error {
    Error::InvalidParameter(format!("minimizer setup: {err}"))
}

/// Fits [`FitModel`]s to [`BinnedDistribution`]s
#[derive(Debug, Clone, Default)]
pub struct Fitter {
    config: FitterConfig,
}

impl Fitter {
    pub fn new(config: FitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Fit `model` to `target`
    ///
    /// On return the model carries the final parameter values and errors,
    /// whether or not the fit converged; inspect [`FitResult::status`].
    /// With fewer usable bins than free parameters the fit does not run:
    /// the status is [`FitStatus::Failed`], values are left as they were
    /// and errors of the free parameters become NaN. Errors only for a
    /// model without free parameters or an invalid minimizer setup.
    #[instrument(skip(self, model, target), fields(model = model.name(), minimizer = ?self.config.minimizer, method = ?self.config.method))]
    pub fn fit<F: ModelFunction>(
        &self,
        model: &mut FitModel<F>,
        target: &BinnedDistribution,
    ) -> Result<FitResult> {
        let free: Vec<usize> = model
            .parameters()
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.fixed)
            .map(|(i, _)| i)
            .collect();
        if free.is_empty() {
            return Err(Error::Fit(format!(
                "model '{}' has no free parameters",
                model.name()
            )));
        }

        let points = self.select_points(model.domain(), target);
        let n_points = points.len();
        if n_points < free.len() {
            debug!(n_points, n_free = free.len(), "Too few bins in the fit domain");
            let params = model.params_mut();
            for &i in &free {
                params[i].error = f64::NAN;
            }
            return Ok(FitResult {
                status: FitStatus::Failed,
                objective: f64::NAN,
                edm: f64::NAN,
                iterations: 0,
                n_points,
                ndf: 0,
            });
        }
        let scale = match self.config.method {
            FitMethod::Likelihood => effective_scale(&points),
            FitMethod::ChiSquare => 1.0,
        };
        let bounds: Vec<ParameterBounds> =
            free.iter().map(|&i| model.parameters()[i].bounds).collect();
        let start = DVector::from_iterator(
            free.len(),
            free.iter()
                .zip(&bounds)
                .map(|(&i, b)| transform::to_internal(model.parameter(i), b)),
        );
        debug!(n_points, n_free = free.len(), scale, "Starting fit");

        let outcome = {
            let problem = Problem {
                function: model.function(),
                method: self.config.method,
                points,
                scale,
                base: model.values(),
                free: free.clone(),
                bounds: bounds.clone(),
            };
            self.minimize(&problem, start)?
        };

        if outcome.objective.is_finite() {
            let params = model.params_mut();
            for (k, &i) in free.iter().enumerate() {
                let int = outcome.internal[k];
                params[i].value = transform::to_external(int, &bounds[k]);
                params[i].error = outcome
                    .covariance
                    .as_ref()
                    .map_or(f64::NAN, |c| external_error(c[(k, k)], int, &bounds[k]));
            }
        }

        let result = FitResult {
            status: outcome.status,
            objective: outcome.objective,
            edm: outcome.edm,
            iterations: outcome.iterations,
            n_points,
            ndf: n_points - free.len(),
        };
        debug!(%result, "Fit finished");
        Ok(result)
    }

    fn select_points(&self, domain: (f64, f64), target: &BinnedDistribution) -> Vec<Point> {
        (0..target.len())
            .filter_map(|i| {
                let x = target.bin_center(i);
                if self.config.restrict_to_domain && !(domain.0 <= x && x <= domain.1) {
                    return None;
                }
                let point = Point {
                    x,
                    y: target.bin_content(i),
                    w2: target.bin_sum_w2(i),
                };
                match self.config.method {
                    FitMethod::ChiSquare if point.w2 <= 0.0 => None,
                    _ => Some(point),
                }
            })
            .collect()
    }

    /// Threshold on the change in objective at which a solver stops by itself
    fn cost_tolerance(&self) -> f64 {
        (0.1 * self.config.tolerance).max(f64::EPSILON)
    }

    fn run_gauss_newton<F: ModelFunction>(
        &self,
        problem: &Problem<'_, F>,
        start: &DVector<f64>,
    ) -> Result<Run> {
        let linesearch = BacktrackingLineSearch::new(ArmijoCondition::new(ARMIJO_C).map_err(solver_setup)?);
        let solver = GaussNewtonLS::new(linesearch)
            .with_tolerance(self.cost_tolerance())
            .map_err(solver_setup)?;
        let init = start.clone();
        let max_iters = self.config.max_iterations as u64;
        let run = Executor::new(LeastSquares(problem), solver)
            .configure(|state| state.param(init).max_iters(max_iters))
            .run();

        Ok(match run {
            Ok(res) => {
                let state = res.state();
                Run {
                    candidates: state
                        .get_best_param()
                        .into_iter()
                        .chain(state.get_param())
                        .cloned()
                        .collect(),
                    iterations: state.get_iter() as usize,
                    stop: Stop::from_status(state.get_termination_status()),
                }
            }
            Err(err) => Run::aborted(err),
        })
    }

    fn run_quasi_newton<F: ModelFunction>(
        &self,
        problem: &Problem<'_, F>,
        start: &DVector<f64>,
    ) -> Result<Run> {
        let solver = LBFGS::new(MoreThuenteLineSearch::new(), LBFGS_MEMORY)
            .with_tolerance_grad(self.config.tolerance.max(0.0))
            .map_err(solver_setup)?
            .with_tolerance_cost(self.cost_tolerance())
            .map_err(solver_setup)?;
        let init: Vec<f64> = start.iter().copied().collect();
        let max_iters = self.config.max_iterations as u64;
        let run = Executor::new(Objective(problem), solver)
            .configure(|state| state.param(init).max_iters(max_iters))
            .run();

        Ok(match run {
            Ok(res) => {
                let state = res.state();
                Run {
                    candidates: state
                        .get_best_param()
                        .into_iter()
                        .chain(state.get_param())
                        .map(|p| DVector::from_column_slice(p))
                        .collect(),
                    iterations: state.get_iter() as usize,
                    stop: Stop::from_status(state.get_termination_status()),
                }
            }
            Err(err) => Run::aborted(err),
        })
    }

    fn minimize<F: ModelFunction>(&self, problem: &Problem<'_, F>, start: DVector<f64>) -> Result<Outcome> {
        let initial = problem.objective(&start);
        if !initial.is_finite() {
            return Ok(Outcome {
                status: FitStatus::Failed,
                internal: start,
                objective: initial,
                edm: f64::NAN,
                iterations: 0,
                covariance: None,
            });
        }

        let run = match self.config.minimizer {
            Minimizer::GaussNewton => self.run_gauss_newton(problem, &start)?,
            Minimizer::QuasiNewton => self.run_quasi_newton(problem, &start)?,
        };
        if let Stop::Other(reason) | Stop::Aborted(reason) = &run.stop {
            debug!(reason = %reason, "Minimizer stopped early");
        }

        // never hand back a point worse than the start
        let (internal, objective) = run
            .candidates
            .into_iter()
            .map(|x| {
                let value = problem.objective(&x);
                (x, value)
            })
            .filter(|(_, value)| value.is_finite())
            .fold((start, initial), |best, candidate| {
                if candidate.1 < best.1 {
                    candidate
                } else {
                    best
                }
            });

        let jacobian = problem.jacobian_at(&internal);
        let jtj = jacobian.transpose() * &jacobian;
        let gradient = jacobian.transpose() * problem.residuals(&internal);
        let edm = solve(&jtj, &(-&gradient)).map(|newton| -0.5 * gradient.dot(&newton));
        let covariance = invert(&jtj);

        let tolerance = self.config.tolerance;
        let status = match (edm, &run.stop) {
            (None, _) => FitStatus::Singular,
            (Some(edm), _) if edm < tolerance => FitStatus::Converged,
            // the solver stalled, accept only close to a minimum
            (Some(edm), Stop::Converged) if edm < tolerance.sqrt() => FitStatus::Converged,
            (_, Stop::MaxIterations) => FitStatus::MaxIterations,
            _ => FitStatus::Failed,
        };
        let status = if status.is_converged() && covariance.is_none() {
            FitStatus::Singular
        } else {
            status
        };

        Ok(Outcome {
            status,
            internal,
            objective,
            edm: edm.unwrap_or(f64::NAN),
            iterations: run.iterations,
            covariance,
        })
    }
}

/// `sum(y) / sum(w^2)` over the selected bins, or 1 when undefined
fn effective_scale(points: &[Point]) -> f64 {
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    let sum_w2: f64 = points.iter().map(|p| p.w2).sum();
    if sum_y > 0.0 && sum_w2 > 0.0 {
        sum_y / sum_w2
    } else {
        1.0
    }
}
