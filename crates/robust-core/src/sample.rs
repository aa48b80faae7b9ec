//! Weighted one-dimensional samples
//!
//! A [`WeightedSample`] is the input every estimator consumes: an
//! order-irrelevant collection of `(value, weight)` pairs. Weights are
//! non-negative and need not sum to one.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single weighted observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub value: f64,
    pub weight: f64,
}

impl Observation {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }

    /// An observation carrying unit weight
    pub fn unit(value: f64) -> Self {
        Self { value, weight: 1.0 }
    }
}

/// A validated, non-empty collection of weighted observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSample {
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl WeightedSample {
    /// Build a sample from parallel value and weight slices.
    ///
    /// Fails when the slices differ in length, are empty, contain
    /// non-finite entries, or carry a negative weight.
    pub fn new(values: &[f64], weights: &[f64]) -> Result<Self> {
        if values.len() != weights.len() {
            return Err(Error::size_mismatch(values.len(), weights.len(), "weighted sample"));
        }
        Self::from_parts(values.to_vec(), weights.to_vec())
    }

    /// Build a sample where every value carries unit weight
    pub fn unweighted(values: &[f64]) -> Result<Self> {
        Self::from_parts(values.to_vec(), vec![1.0; values.len()])
    }

    /// Build a sample from observations
    pub fn from_observations<I>(observations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Observation>,
    {
        let (values, weights) = observations
            .into_iter()
            .map(|o| (o.value, o.weight))
            .unzip();
        Self::from_parts(values, weights)
    }

    fn from_parts(values: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InsufficientData { expected: 1, actual: 0 });
        }
        if values.iter().chain(weights.iter()).any(|x| !x.is_finite()) {
            return Err(Error::non_finite("weighted sample"));
        }
        if let Some(w) = weights.iter().find(|&&w| w < 0.0) {
            return Err(Error::InvalidInput(format!("negative weight {w} in weighted sample")));
        }
        Ok(Self { values, weights })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Iterate over `(value, weight)` observations
    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.values
            .iter()
            .zip(self.weights.iter())
            .map(|(&value, &weight)| Observation { value, weight })
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Smallest and largest value
    pub fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

impl fmt::Display for WeightedSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.min_max();
        write!(
            f,
            "WeightedSample(n={}, sum_w={:.3}, range=[{:.4}, {:.4}])",
            self.len(),
            self.total_weight(),
            lo,
            hi
        )
    }
}
