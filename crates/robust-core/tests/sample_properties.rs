//! Property tests for sample construction and the slice helpers

use approx::assert_relative_eq;
use proptest::prelude::*;
use robust_core::utils::{padded_range, points_for_fraction, sorted};
use robust_core::{Observation, WeightedSample};

proptest! {
    #[test]
    fn prop_sample_keeps_pairs(
        pairs in prop::collection::vec((-1e3f64..1e3, 0.0f64..10.0), 1..100)
    ) {
        let observations = pairs.iter().map(|&(v, w)| Observation::new(v, w));
        let sample = WeightedSample::from_observations(observations).unwrap();

        prop_assert_eq!(sample.len(), pairs.len());
        let expected: f64 = pairs.iter().map(|&(_, w)| w).sum();
        assert_relative_eq!(sample.total_weight(), expected, max_relative = 1e-12);

        let (lo, hi) = sample.min_max();
        for obs in sample.iter() {
            prop_assert!(lo <= obs.value && obs.value <= hi);
        }
    }

    #[test]
    fn prop_sorted_is_ordered_permutation(data in prop::collection::vec(-1e6f64..1e6, 0..200)) {
        let s = sorted(&data);
        prop_assert_eq!(s.len(), data.len());
        prop_assert!(s.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_padded_range_contains_input(a in -100.0f64..100.0, b in -100.0f64..100.0, pad in 0.0f64..1.0) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let (lo, hi) = padded_range(min, max, pad);
        prop_assert!(lo <= min && max <= hi);
        prop_assert!(hi > lo);
    }

    #[test]
    fn prop_points_for_fraction_bounded(fraction in 0.0f64..=1.0, n in 0usize..10_000) {
        let k = points_for_fraction(fraction, n);
        prop_assert!(k <= n);
    }
}

#[test]
fn test_negative_weight_rejected_anywhere() {
    for position in 0..3 {
        let mut weights = vec![1.0; 3];
        weights[position] = -1e-9;
        assert!(WeightedSample::new(&[1.0, 2.0, 3.0], &weights).is_err());
    }
}
