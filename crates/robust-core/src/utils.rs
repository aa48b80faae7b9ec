//! Utility functions for working with data slices

/// Sort data and return a new vector
///
/// Handles NaN values by placing them at the end.
///
/// # Examples
///
/// ```rust
/// use robust_core::utils::sorted;
///
/// let data = vec![3.0, 1.0, 5.0, 2.0, 4.0];
/// assert_eq!(sorted(&data), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
/// ```
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater, // NaN goes after non-NaN
            (false, true) => std::cmp::Ordering::Less,    // non-NaN goes before NaN
            (false, false) => a.total_cmp(b),
        }
    });
    sorted
}

/// Widen `[min, max]` by `padding` times its span on each side
///
/// A zero-span range is widened to `[v - 0.5, v + 0.5]` so that a
/// histogram can still be built over it.
///
/// # Examples
///
/// ```rust
/// use robust_core::utils::padded_range;
///
/// assert_eq!(padded_range(0.0, 10.0, 0.1), (-1.0, 11.0));
/// assert_eq!(padded_range(2.0, 2.0, 0.1), (1.5, 2.5));
/// ```
pub fn padded_range(min: f64, max: f64, padding: f64) -> (f64, f64) {
    let span = max - min;
    if span > 0.0 {
        (min - padding * span, max + padding * span)
    } else {
        (min - 0.5, max + 0.5)
    }
}

/// Number of leading points a mass fraction selects out of `n`
///
/// This is `floor(fraction * n)`.
pub fn points_for_fraction(fraction: f64, n: usize) -> usize {
    (fraction * n as f64).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_basic() {
        let data = vec![3.0, 1.0, 5.0, 2.0, 4.0];
        assert_eq!(sorted(&data), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_sorted_empty() {
        let data: Vec<f64> = vec![];
        assert_eq!(sorted(&data), Vec::<f64>::new());
    }

    #[test]
    fn test_sorted_with_nan() {
        let data = vec![3.0, f64::NAN, 1.0, 2.0];
        let sorted_data = sorted(&data);

        assert_eq!(sorted_data[0], 1.0);
        assert_eq!(sorted_data[1], 2.0);
        assert_eq!(sorted_data[2], 3.0);
        assert!(sorted_data[3].is_nan());
    }

    #[test]
    fn test_sorted_preserves_original() {
        let data = vec![3.0, 1.0, 5.0, 2.0, 4.0];
        let original = data.clone();
        let _ = sorted(&data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range(0.9, 1.1, 0.1);
        assert!((lo - 0.88).abs() < 1e-12);
        assert!((hi - 1.12).abs() < 1e-12);
        assert_eq!(padded_range(-1.0, -1.0, 0.1), (-1.5, -0.5));
    }

    #[test]
    fn test_points_for_fraction() {
        assert_eq!(points_for_fraction(0.68, 100), 68);
        assert_eq!(points_for_fraction(0.5, 3), 1);
        assert_eq!(points_for_fraction(1.0, 7), 7);
        assert_eq!(points_for_fraction(0.1, 5), 0);
    }
}
