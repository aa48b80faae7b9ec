//! Operations on binned distributions

use crate::types::BinnedDistribution;
use robust_core::{Error, Result};

/// Operations that relate a distribution to a sub-range or to another distribution
pub trait HistogramOps {
    /// Copy of this distribution keeping only bins whose centers lie in `[min, max]`
    ///
    /// Contents and squared weights of the kept bins are copied verbatim;
    /// statistics of the result are derived from bin centers.
    fn restricted_to(&self, min: f64, max: f64) -> BinnedDistribution;

    /// Linearly interpolated bin content at `x`
    ///
    /// Interpolates between the two nearest bin centers. In the outer half
    /// bins the content of the edge bin is returned. `None` outside the
    /// distribution's range.
    fn interpolate(&self, x: f64) -> Option<f64>;

    /// Factor mapping `other` onto this distribution's integral per unit bin width
    ///
    /// `(integral(self) / integral(other)) * (width(self) / width(other))`
    fn normalization_factor(&self, other: &BinnedDistribution) -> Result<f64>;
}

impl HistogramOps for BinnedDistribution {
    fn restricted_to(&self, min: f64, max: f64) -> BinnedDistribution {
        let mut restricted = self.cleared();
        for i in 0..self.len() {
            let center = self.bin_center(i);
            if center >= min && center <= max {
                restricted.set_bin_content(i, self.bin_content(i), self.bin_sum_w2(i));
            }
        }
        restricted
    }

    fn interpolate(&self, x: f64) -> Option<f64> {
        let bin = self.find_bin(x)?;
        let (bin1, bin2) = if x >= self.bin_center(bin) {
            (bin, bin + 1)
        } else if bin > 0 {
            (bin - 1, bin)
        } else {
            return Some(self.bin_content(bin));
        };
        if bin2 >= self.len() {
            return Some(self.bin_content(bin));
        }

        let (x1, y1) = (self.bin_center(bin1), self.bin_content(bin1));
        let (x2, y2) = (self.bin_center(bin2), self.bin_content(bin2));
        let slope = (y2 - y1) / (x2 - x1);
        Some(y1 + slope * (x - x1))
    }

    fn normalization_factor(&self, other: &BinnedDistribution) -> Result<f64> {
        let own = self.integral();
        let theirs = other.integral();
        if !(own > 0.0) || !(theirs > 0.0) {
            return Err(Error::DegenerateInput(format!(
                "normalization needs positive integrals, got {own} and {theirs}"
            )));
        }
        Ok(own / theirs * self.bin_width() / other.bin_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> BinnedDistribution {
        let mut h = BinnedDistribution::new(4, 0.0, 4.0).unwrap();
        for (i, w) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            h.fill_weighted(i as f64 + 0.5, w);
        }
        h
    }

    #[test]
    fn test_restricted_to() {
        let h = ramp();
        let r = h.restricted_to(1.0, 3.0);
        assert_eq!(r.contents(), &[0.0, 2.0, 3.0, 0.0]);
        assert_relative_eq!(r.bin_sum_w2(2), 9.0);
        assert_relative_eq!(r.mean(), (1.5 * 2.0 + 2.5 * 3.0) / 5.0);
    }

    #[test]
    fn test_interpolate() {
        let h = ramp();
        assert_relative_eq!(h.interpolate(1.0).unwrap(), 1.5);
        assert_relative_eq!(h.interpolate(2.5).unwrap(), 3.0);
        assert_relative_eq!(h.interpolate(0.2).unwrap(), 1.0);
        assert_relative_eq!(h.interpolate(3.9).unwrap(), 4.0);
        assert!(h.interpolate(4.0).is_none());
        assert!(h.interpolate(-0.1).is_none());
    }

    #[test]
    fn test_normalization_factor() {
        let observed = ramp(); // integral 10, width 1
        let mut reference = BinnedDistribution::new(8, 0.0, 4.0).unwrap(); // width 0.5
        reference.fill_weighted(1.0, 5.0);

        let factor = observed.normalization_factor(&reference).unwrap();
        assert_relative_eq!(factor, 10.0 / 5.0 * 1.0 / 0.5);

        let empty = observed.cleared();
        assert!(observed.normalization_factor(&empty).is_err());
    }
}
