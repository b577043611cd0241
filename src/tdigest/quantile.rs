//! Quantile evaluation for `TDigest`.
//!
//! Each centroid is placed at the *center* of its mass: `center = cum + w/2`, where
//! `cum` is the weight strictly before it. For a target rank `t = q·N` the walk stops at
//! the first centroid whose center reaches `t`, and the estimate comes from that
//! centroid and its predecessor:
//!
//! - unit centroids (`w == 1`) are point masses, so half a unit on their side of the
//!   span is a **dead zone** that snaps to the mean;
//! - `t` inside the left dead zone → predecessor mean;
//! - `t` inside the right dead zone → current mean;
//! - otherwise interpolate linearly in rank between the two means.
//!
//! # Guarantees
//! - Monotone in `q`.
//! - `quantile(0) == min`, `quantile(1) == max` (the edge centroids are never folded).
//! - While no interior folding has happened, mid-ranks `(i + 0.5)/N` return the exact
//!   order statistic.
//!
//! # Edge cases
//! - Empty digest → `NaN`.
//! - `q` is NaN → `NaN`.
//! - `q ≤ 0` → first mean, `q ≥ 1` → last mean.

use crate::tdigest::centroids::Centroid;
use crate::tdigest::TDigest;

impl TDigest {
    /// Estimate the value at quantile `q`. Folds pending points in first.
    pub fn quantile(&mut self, q: f64) -> f64 {
        if self.is_empty() || q.is_nan() {
            return f64::NAN;
        }
        let total = self.total_weight();
        estimate_quantile(self.centroids(), total, q)
    }

    /// Vectorized [`TDigest::quantile`]; materializes once.
    pub fn quantiles(&mut self, qs: &[f64]) -> Vec<f64> {
        if self.is_empty() {
            return vec![f64::NAN; qs.len()];
        }
        let total = self.total_weight();
        let cents = self.centroids();
        qs.iter()
            .map(|&q| estimate_quantile(cents, total, q))
            .collect()
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

/// Pure quantile estimate over an ascending store whose weights sum to `total_weight`.
pub(crate) fn estimate_quantile(cents: &[Centroid], total_weight: u64, q: f64) -> f64 {
    let (Some(first), Some(last)) = (cents.first(), cents.last()) else {
        return f64::NAN;
    };
    if q.is_nan() {
        return f64::NAN;
    }
    if q <= 0.0 || cents.len() == 1 {
        return first.mean();
    }
    if q >= 1.0 {
        return last.mean();
    }

    let target = q * total_weight as f64;
    let mut prev = first;
    let mut prev_center = 0.0;
    let mut cum = 0.0;

    for c in cents {
        let w = c.weight() as f64;
        let center = cum + 0.5 * w;
        if center >= target {
            let left = prev_center + dead_zone(prev);
            let right = center - dead_zone(c);
            if target <= left {
                return prev.mean();
            }
            if target >= right {
                return c.mean();
            }
            let t = (target - left) / (right - left);
            let (lo, hi) = (prev.mean(), c.mean());
            let span = hi - lo;
            let v = if span.is_finite() {
                lo + t * span
            } else {
                lo * (1.0 - t) + hi * t
            };
            return v.clamp(lo, hi);
        }
        cum += w;
        prev = c;
        prev_center = center;
    }
    last.mean()
}
