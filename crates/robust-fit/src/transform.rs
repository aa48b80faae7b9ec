//! Mapping between bounded external parameters and unbounded internal ones
//!
//! Two-sided bounds use `ext = lo + (hi - lo) * (sin(int) + 1) / 2`,
//! one-sided bounds use the square-root mapping, so the minimizer can move
//! freely while every evaluated value respects the bounds.

use crate::model::ParameterBounds;

pub(crate) fn to_internal(value: f64, bounds: &ParameterBounds) -> f64 {
    match (bounds.lower, bounds.upper) {
        (Some(lo), Some(hi)) => {
            let s = (2.0 * (value - lo) / (hi - lo) - 1.0).clamp(-1.0, 1.0);
            s.asin()
        }
        (Some(lo), None) => {
            let d = (value - lo).max(0.0) + 1.0;
            (d * d - 1.0).sqrt()
        }
        (None, Some(hi)) => {
            let d = (hi - value).max(0.0) + 1.0;
            (d * d - 1.0).sqrt()
        }
        (None, None) => value,
    }
}

pub(crate) fn to_external(internal: f64, bounds: &ParameterBounds) -> f64 {
    match (bounds.lower, bounds.upper) {
        (Some(lo), Some(hi)) => lo + (hi - lo) * (internal.sin() + 1.0) / 2.0,
        (Some(lo), None) => lo - 1.0 + (internal * internal + 1.0).sqrt(),
        (None, Some(hi)) => hi + 1.0 - (internal * internal + 1.0).sqrt(),
        (None, None) => internal,
    }
}

/// Derivative of the external value with respect to the internal one
pub(crate) fn derivative(internal: f64, bounds: &ParameterBounds) -> f64 {
    match (bounds.lower, bounds.upper) {
        (Some(lo), Some(hi)) => (hi - lo) / 2.0 * internal.cos(),
        (Some(_), None) => internal / (internal * internal + 1.0).sqrt(),
        (None, Some(_)) => -internal / (internal * internal + 1.0).sqrt(),
        (None, None) => 1.0,
    }
}

/// Slope of the mapping below which a parameter counts as sitting on a bound
const LIMIT_SLOPE: f64 = 1e-6;

/// Whether the internal value maps onto one of the bounds
pub(crate) fn at_limit(internal: f64, bounds: &ParameterBounds) -> bool {
    match (bounds.lower, bounds.upper) {
        (Some(_), Some(_)) => internal.cos().abs() < LIMIT_SLOPE,
        (Some(_), None) | (None, Some(_)) => internal.abs() < LIMIT_SLOPE,
        (None, None) => false,
    }
}
