//! Core types for binned distribution representation

use robust_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running weighted moments of the values filled into a distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct Moments {
    sum_w: f64,
    sum_w2: f64,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Moments {
    fn add(&mut self, x: f64, w: f64) {
        self.sum_w += w;
        self.sum_w2 += w * w;
        self.sum_wx += w * x;
        self.sum_wx2 += w * x * x;
    }

    fn scale(&mut self, factor: f64) {
        self.sum_w *= factor;
        self.sum_w2 *= factor * factor;
        self.sum_wx *= factor;
        self.sum_wx2 *= factor;
    }
}

/// A fixed-width weighted histogram over `[low, high)`
///
/// Each bin carries an accumulated weight and an accumulated squared
/// weight, so that errors propagate correctly for weighted fills.
/// Values outside the range are counted in underflow/overflow and take
/// no part in statistics or integrals.
///
/// `mean()` is the exact weighted mean of the filled values while the
/// distribution has only been filled or scaled. After bin contents are
/// set directly the statistics are derived from bin centers instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedDistribution {
    low: f64,
    high: f64,
    contents: Vec<f64>,
    sum_w2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    moments: Moments,
    exact_moments: bool,
}

impl BinnedDistribution {
    /// Create an empty distribution with `bins` equal-width bins over `[low, high)`
    pub fn new(bins: usize, low: f64, high: f64) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidParameter("number of bins must be at least 1".to_string()));
        }
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::non_finite("histogram range"));
        }
        if low >= high {
            return Err(Error::InvalidParameter(format!(
                "histogram range [{low}, {high}) must have low < high"
            )));
        }
        Ok(Self {
            low,
            high,
            contents: vec![0.0; bins],
            sum_w2: vec![0.0; bins],
            underflow: 0.0,
            overflow: 0.0,
            moments: Moments::default(),
            exact_moments: true,
        })
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// True when no in-range weight has been accumulated
    pub fn is_empty(&self) -> bool {
        self.contents.iter().all(|&c| c == 0.0)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.len() as f64
    }

    /// Lower edge of bin `i` (0-based)
    pub fn bin_low_edge(&self, i: usize) -> f64 {
        self.low + i as f64 * self.bin_width()
    }

    /// Center of bin `i` (0-based)
    pub fn bin_center(&self, i: usize) -> f64 {
        self.low + (i as f64 + 0.5) * self.bin_width()
    }

    /// Index of the bin containing `x`, if `x` lies in `[low, high)`
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.low && x < self.high) {
            return None;
        }
        let idx = ((x - self.low) / self.bin_width()).floor() as usize;
        // Guard against rounding just below `high`
        Some(idx.min(self.len() - 1))
    }

    /// Fill `x` with unit weight
    pub fn fill(&mut self, x: f64) -> Option<usize> {
        self.fill_weighted(x, 1.0)
    }

    /// Fill `x` with weight `w`, returning the bin it landed in
    pub fn fill_weighted(&mut self, x: f64, w: f64) -> Option<usize> {
        match self.find_bin(x) {
            Some(idx) => {
                self.contents[idx] += w;
                self.sum_w2[idx] += w * w;
                self.moments.add(x, w);
                Some(idx)
            }
            None => {
                if x < self.low {
                    self.underflow += w;
                } else {
                    self.overflow += w;
                }
                None
            }
        }
    }

    pub fn bin_content(&self, i: usize) -> f64 {
        self.contents[i]
    }

    /// Accumulated squared weight of bin `i`
    pub fn bin_sum_w2(&self, i: usize) -> f64 {
        self.sum_w2[i]
    }

    /// Statistical error on bin `i`
    pub fn bin_error(&self, i: usize) -> f64 {
        self.sum_w2[i].sqrt()
    }

    /// Overwrite bin `i`; statistics are then derived from bin centers
    pub fn set_bin_content(&mut self, i: usize, content: f64, sum_w2: f64) {
        self.contents[i] = content;
        self.sum_w2[i] = sum_w2;
        self.exact_moments = false;
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub fn centers(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.bin_center(i)).collect()
    }

    /// Prefix sums of bin contents: element `i` is the content of bins `0..=i`
    pub fn cumulative(&self) -> Vec<f64> {
        self.contents
            .iter()
            .scan(0.0, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }

    /// Sum of in-range bin contents
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Largest bin content
    pub fn maximum(&self) -> f64 {
        self.contents.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn current_moments(&self) -> Moments {
        if self.exact_moments {
            return self.moments;
        }
        let mut m = Moments::default();
        for (i, (&c, &w2)) in self.contents.iter().zip(self.sum_w2.iter()).enumerate() {
            let x = self.bin_center(i);
            m.sum_w += c;
            m.sum_w2 += w2;
            m.sum_wx += c * x;
            m.sum_wx2 += c * x * x;
        }
        m
    }

    /// Weighted mean; NaN when no weight has been accumulated
    pub fn mean(&self) -> f64 {
        let m = self.current_moments();
        if m.sum_w == 0.0 {
            return f64::NAN;
        }
        m.sum_wx / m.sum_w
    }

    /// Weighted standard deviation (population form)
    pub fn rms(&self) -> f64 {
        let m = self.current_moments();
        if m.sum_w == 0.0 {
            return f64::NAN;
        }
        let mean = m.sum_wx / m.sum_w;
        (m.sum_wx2 / m.sum_w - mean * mean).max(0.0).sqrt()
    }

    /// Effective number of entries, `(Σw)² / Σw²`
    pub fn effective_entries(&self) -> f64 {
        let m = self.current_moments();
        if m.sum_w2 == 0.0 {
            return 0.0;
        }
        m.sum_w * m.sum_w / m.sum_w2
    }

    /// Standard error of the weighted mean, `rms / sqrt(n_eff)`
    pub fn mean_error(&self) -> f64 {
        let n_eff = self.effective_entries();
        if n_eff == 0.0 {
            return f64::NAN;
        }
        self.rms() / n_eff.sqrt()
    }

    /// Multiply every bin by `factor` in place
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.contents {
            *c *= factor;
        }
        for w2 in &mut self.sum_w2 {
            *w2 *= factor * factor;
        }
        self.underflow *= factor;
        self.overflow *= factor;
        self.moments.scale(factor);
    }

    /// A copy with every bin multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let mut copy = self.clone();
        copy.scale(factor);
        copy
    }

    /// A copy scaled to unit integral
    pub fn normalized(&self) -> Result<Self> {
        let integral = self.integral();
        if !(integral > 0.0) {
            return Err(Error::DegenerateInput(format!(
                "cannot normalize a distribution with integral {integral}"
            )));
        }
        Ok(self.scaled(1.0 / integral))
    }

    /// An empty distribution with the same binning
    pub fn cleared(&self) -> Self {
        Self {
            low: self.low,
            high: self.high,
            contents: vec![0.0; self.len()],
            sum_w2: vec![0.0; self.len()],
            underflow: 0.0,
            overflow: 0.0,
            moments: Moments::default(),
            exact_moments: true,
        }
    }
}

impl fmt::Display for BinnedDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BinnedDistribution({} bins, range=[{:.4}, {:.4}), integral={:.4})",
            self.len(),
            self.low,
            self.high,
            self.integral()
        )
    }
}
