//! Bounded nonlinear fits of parametric models to binned distributions
//!
//! A [`FitModel`] couples a [`ModelFunction`] with a fit domain and named
//! parameters that can be seeded, fixed or bounded. A [`Fitter`] adjusts
//! the free parameters to a [`BinnedDistribution`](robust_histogram::BinnedDistribution)
//! and writes the fitted values and errors back onto the model.
//!
//! # Example
//!
//! ```rust
//! use robust_fit::{FitModel, Fitter, FitterConfig, GaussianPeak};
//! use robust_histogram::BinnedDistribution;
//!
//! let mut h = BinnedDistribution::new(40, 0.8, 1.2).unwrap();
//! for i in 0..400 {
//!     let x = 1.0 + 0.05 * ((i as f64 + 0.5) / 400.0 - 0.5) * 2.0;
//!     h.fill(x);
//!     h.fill(1.0 + 0.5 * (x - 1.0));
//! }
//!
//! let mut model = FitModel::new("peak", GaussianPeak, 0.9, 1.1).unwrap();
//! model.set_parameters(&[h.maximum(), 1.0, 0.05]);
//!
//! let result = Fitter::new(FitterConfig::default()).fit(&mut model, &h).unwrap();
//! println!("{result}");
//! println!("{model}");
//! ```

pub mod config;
pub mod fitter;
pub mod function;
pub mod model;
pub mod template;
mod transform;

pub use config::{FitMethod, FitterConfig, Minimizer};
pub use fitter::{FitResult, FitStatus, Fitter};
pub use function::{GaussianPeak, ModelFunction};
pub use model::{FitModel, Parameter, ParameterBounds};
pub use template::{TemplateFunction, TEMPLATE_FLOOR};

pub use robust_core::Result;
