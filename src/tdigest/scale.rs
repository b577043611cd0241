use std::f64::consts::PI;

#[inline]
pub(crate) fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Arcsine scale `k(q) = asin(2q − 1) / (2π·δ)`.
///
/// Monotone on `[0, 1]` and steepest at both ends, so a fixed `Δk ≤ 1` budget buys
/// small clusters near `q = 0` and `q = 1` and large ones around the median.
/// The full `k` range spans `1/(2δ)`, which bounds the centroid count at `O(1/δ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ArcsineScale {
    inv_norm: f64,
}

impl ArcsineScale {
    /// `compression` is the resolution `δ` (validated `> 0` by the config).
    #[inline]
    pub(crate) fn new(compression: f64) -> Self {
        Self {
            inv_norm: 1.0 / (2.0 * PI * compression),
        }
    }

    /// Map `q` to the k axis; `q` is clamped into `[0, 1]` first.
    #[inline]
    pub(crate) fn k(&self, q: f64) -> f64 {
        let qq = clamp(q, 0.0, 1.0);
        (2.0 * qq - 1.0).asin() * self.inv_norm
    }
}
