//! Benchmarks for the shortest-interval searches
//!
//! The raw search is dominated by the sort, the binned search by its
//! quadratic scan over bin pairs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use robust_calibration::prelude::*;

fn sample_values(n: usize) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let normal = Normal::new(1.0, 0.05).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn bench_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_interval_raw");
    for n in [1_000, 10_000, 100_000] {
        let values = sample_values(n);
        let estimator = ShortestInterval::with_fraction(0.68);
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| estimator.estimate_values(black_box(values)))
        });
    }
    group.finish();
}

fn bench_binned(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_interval_binned");
    let values = sample_values(100_000);
    for bins in [100, 500, 2_000] {
        let mut h = BinnedDistribution::new(bins, 0.5, 1.5).unwrap();
        for &x in &values {
            h.fill(x);
        }
        let estimator = BinnedShortestInterval::new(0.68);
        group.bench_with_input(BenchmarkId::from_parameter(bins), &h, |b, h| {
            b.iter(|| estimator.estimate_binned(black_box(h)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_raw, bench_binned);
criterion_main!(benches);
