//! CDF (cumulative distribution function) evaluation for `TDigest`.
//!
//! The counterpart of [`TDigest::quantile`]: same center/half-weight placement, same
//! unit dead zones, so the two are consistent inverses on uncompressed data.
//!
//! # Semantics
//! - **Outside support**: strictly below the first mean → `0`, strictly above the last
//!   mean → `1` (the edge centroids are the exact min and max).
//! - **Exact mean hit**: midpoint of the mass sitting at that mean (all tied centroids).
//! - **Between means**: linear in value from the left centroid's center to the right
//!   one's, with half a unit removed on unit sides. Two unit neighbours give a step.
//!
//! # Edge cases
//! - Empty digest → a `NaN` per query point.
//! - NaN query point → `NaN` in that slot.
//!
//! Each point is `O(log n)`; the prefix sums are built once per call. Large batches run
//! on the Rayon pool.

use crate::tdigest::centroids::Centroid;
use crate::tdigest::TDigest;
use rayon::prelude::*;

/// Crossover for parallel evaluation with Rayon.
const PAR_MIN: usize = 32_768;

impl TDigest {
    /// Estimate the CDF at each `vals[i]`. Folds pending points in first.
    pub fn cdf(&mut self, vals: &[f64]) -> Vec<f64> {
        if self.is_empty() {
            return vec![f64::NAN; vals.len()];
        }
        if vals.is_empty() {
            return Vec::new();
        }

        let cents = self.centroids();
        let mut prefix: Vec<f64> = Vec::with_capacity(cents.len() + 1);
        let mut run = 0.0;
        prefix.push(run);
        for c in cents {
            run += c.weight() as f64;
            prefix.push(run);
        }
        let total = run;

        if vals.len() >= PAR_MIN {
            vals.par_iter()
                .with_min_len(4096)
                .map(|&v| cdf_at(v, cents, &prefix, total))
                .collect()
        } else {
            vals.iter().map(|&v| cdf_at(v, cents, &prefix, total)).collect()
        }
    }

    /// Single-point convenience over [`TDigest::cdf`].
    #[inline]
    pub fn cdf_one(&mut self, val: f64) -> f64 {
        self.cdf(&[val])[0]
    }
}

#[inline]
fn dead_zone(c: &Centroid) -> f64 {
    if c.is_unit() {
        0.5
    } else {
        0.0
    }
}

/// `prefix[i]` is the weight strictly before centroid `i`; `prefix[n] == total`.
#[inline]
fn cdf_at(val: f64, cents: &[Centroid], prefix: &[f64], total: f64) -> f64 {
    if val.is_nan() {
        return f64::NAN;
    }
    let n = cents.len();
    let lo = cents.partition_point(|c| c.mean() < val);
    let hi = lo + cents[lo..].partition_point(|c| c.mean() <= val);

    if lo < hi {
        let below = prefix[lo];
        let through = prefix[hi];
        return (below + 0.5 * (through - below)) / total;
    }
    if lo == 0 {
        return 0.0;
    }
    if lo == n {
        return 1.0;
    }

    let (l, r) = (&cents[lo - 1], &cents[lo]);
    let left = prefix[lo - 1] + 0.5 * l.weight() as f64 + dead_zone(l);
    let right = prefix[lo] + 0.5 * r.weight() as f64 - dead_zone(r);
    let (num, den) = (val - l.mean(), r.mean() - l.mean());
    let frac = if den.is_finite() {
        num / den
    } else {
        (0.5 * val - 0.5 * l.mean()) / (0.5 * r.mean() - 0.5 * l.mean())
    };
    let rank = left + frac * (right - left).max(0.0);
    (rank / total).clamp(0.0, 1.0)
}
