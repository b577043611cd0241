use ordered_float::OrderedFloat;
use std::cmp::Ordering;

use crate::{TdError, TdResult};

/// A centroid summarizes a cluster of observations in the digest.
///
/// Raw points waiting in the ingest buffer use the same type: a point of value `v`
/// added with weight `w` is the centroid `(v, w)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Centroid {
    mean: OrderedFloat<f64>,
    weight: u64,
}

impl PartialOrd for Centroid {
    fn partial_cmp(&self, other: &Centroid) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Centroid {
    fn cmp(&self, other: &Centroid) -> Ordering {
        // Equal means are allowed in the store; ties keep their relative order
        // when callers use a stable sort.
        self.mean.cmp(&other.mean)
    }
}

impl Centroid {
    /// Checked constructor for callers outside the crate.
    pub fn try_new(mean: f64, weight: u64) -> TdResult<Self> {
        if !mean.is_finite() {
            return Err(TdError::InvalidArgument {
                context: "centroid mean (NaN or ±inf)",
            });
        }
        if weight == 0 {
            return Err(TdError::Overflow {
                context: "centroid weight must be >= 1",
            });
        }
        Ok(Centroid::new(mean, weight))
    }

    #[inline]
    pub(crate) fn new(mean: f64, weight: u64) -> Self {
        debug_assert!(weight >= 1);
        Centroid {
            mean: OrderedFloat::from(mean),
            weight,
        }
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean.into_inner()
    }
    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight
    }
    /// A unit centroid is a single observation; the estimators treat it as an exact point.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.weight == 1
    }

    /// Fold `other` into this centroid with the incremental weighted-mean update
    /// `mean += (other.mean - mean) * other.weight / (weight + other.weight)`.
    /// Means whose difference overflows `f64` fall back to the convex combination.
    #[inline]
    pub(crate) fn absorb(&mut self, other: &Centroid) {
        let m0 = self.mean();
        let m1 = other.mean();
        let new_w = self.weight + other.weight;
        if m1 != m0 {
            let (w0, w1, w) = (self.weight as f64, other.weight as f64, new_w as f64);
            let d = m1 - m0;
            let mut m = if d.is_finite() {
                m0 + d * w1 / w
            } else {
                m0 * (w0 / w) + m1 * (w1 / w)
            };
            // keep the mean within the absorbed range under rounding
            m = if m1 > m0 { m.clamp(m0, m1) } else { m.clamp(m1, m0) };
            self.mean = OrderedFloat::from(m);
        }
        self.weight = new_w;
    }
}

/* ===========================
 * Helpers used by compressor and codec
 * =========================== */

/// Non-strictly increasing by mean (equal means allowed).
#[inline]
pub fn is_sorted_by_mean(cs: &[Centroid]) -> bool {
    cs.windows(2).all(|w| w[0] <= w[1])
}

/// Sum of centroid weights, `None` on `u64` overflow.
#[inline]
pub(crate) fn total_weight_of(cs: &[Centroid]) -> Option<u64> {
    cs.iter().try_fold(0u64, |acc, c| acc.checked_add(c.weight()))
}
