//! tdigest-testdata
//! Seeded synthetic streams shared by the tdigest-stream tests.
//! Samples keep their natural scale; nothing is squashed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

/// Available synthetic distributions.
#[derive(Clone, Copy, Debug)]
pub enum DistKind {
    /// Uniform in `[lo, hi)`
    Uniform { lo: f64, hi: f64 },
    /// Gaussian `N(mean, std²)`
    Gaussian { mean: f64, std: f64 },
    /// Exponential with rate `lambda` (long right tail)
    Exponential { lambda: f64 },
    /// Two tight clumps plus a broad background
    Mixture,
}

/// Generate `n` samples for the chosen distribution.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    match kind {
        DistKind::Uniform { lo, hi } => {
            for _ in 0..n {
                out.push(rng.random_range(lo..hi));
            }
        }
        DistKind::Gaussian { mean, std } => {
            let normal = Normal::new(mean, std).expect("finite std");
            for _ in 0..n {
                out.push(normal.sample(&mut rng));
            }
        }
        DistKind::Exponential { lambda } => {
            let exp = Exp::new(lambda).expect("positive rate");
            for _ in 0..n {
                out.push(exp.sample(&mut rng));
            }
        }
        DistKind::Mixture => {
            for _ in 0..n {
                let bucket: u32 = rng.random_range(0..100);
                let v = match bucket {
                    0..=34 => -50.0 + rng.random_range(-1.0..1.0) * 1e-2,
                    35..=69 => 50.0 + rng.random_range(-1.0..1.0) * 1e-2,
                    _ => rng.random_range(-100.0..100.0),
                };
                out.push(v);
            }
        }
    }
    out
}

/// `(value, weight)` pairs with weights drawn from `1..=max_weight`.
pub fn gen_weighted(kind: DistKind, n: usize, max_weight: i64, seed: u64) -> Vec<(f64, i64)> {
    let values = gen_dataset(kind, n, seed);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
    values
        .into_iter()
        .map(|v| (v, rng.random_range(1..=max_weight)))
        .collect()
}

/// `0.0, 1.0, …, (n-1) as f64` in a seeded random order.
pub fn shuffled_ramp(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    xs.shuffle(&mut rng);
    xs
}
