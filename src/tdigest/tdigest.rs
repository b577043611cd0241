// src/tdigest/tdigest.rs
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::tdigest::buffer::Phase;
use crate::tdigest::centroids::Centroid;
use crate::tdigest::compressor::compress_into;
use crate::tdigest::merges::MergeByMean;
use crate::{TdError, TdResult};

pub const DEFAULT_COMPRESSION: f64 = 0.01;
pub const DEFAULT_BUFFER_CAPACITY: usize = 2048;
pub const DEFAULT_MAX_CENTROIDS: usize = 2048;
/// First and last centroids are never folded, so a store needs room for one interior cluster.
pub const MIN_MAX_CENTROIDS: usize = 3;

/* =============================================================================
 * Configuration / Builder
 * ============================================================================= */

/// Construction-time configuration.
///
/// - `compression` (δ): resolution of the scale function. Smaller is more accurate and
///   keeps more centroids (about `1/δ`).
/// - `buffer_capacity`: raw points held before an automatic compress.
/// - `max_centroids`: hard cap on the store; only reached with very small `δ`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigestConfig {
    pub compression: f64,
    pub buffer_capacity: usize,
    pub max_centroids: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            compression: DEFAULT_COMPRESSION,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_centroids: DEFAULT_MAX_CENTROIDS,
        }
    }
}

impl DigestConfig {
    pub fn validate(&self) -> TdResult<()> {
        if !self.compression.is_finite() || self.compression <= 0.0 {
            return Err(TdError::InvalidArgument {
                context: "compression must be finite and > 0",
            });
        }
        if self.buffer_capacity < 1 {
            return Err(TdError::InvalidArgument {
                context: "buffer_capacity must be >= 1",
            });
        }
        if self.max_centroids < MIN_MAX_CENTROIDS {
            return Err(TdError::InvalidArgument {
                context: "max_centroids must be >= 3",
            });
        }
        Ok(())
    }
}

/// Builder for [`TDigest`].
#[derive(Debug, Clone, Default)]
pub struct TDigestBuilder {
    config: DigestConfig,
}

impl TDigestBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution δ of the scale function.
    #[inline]
    pub fn compression(mut self, delta: f64) -> Self {
        self.config.compression = delta;
        self
    }

    #[inline]
    pub fn buffer_capacity(mut self, n: usize) -> Self {
        self.config.buffer_capacity = n;
        self
    }

    #[inline]
    pub fn max_centroids(mut self, n: usize) -> Self {
        self.config.max_centroids = n;
        self
    }

    /// Replace every setting at once.
    #[inline]
    pub fn config(mut self, config: DigestConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and build an empty digest.
    pub fn build(self) -> TdResult<TDigest> {
        self.config.validate()?;
        Ok(TDigest::empty(self.config))
    }
}

/* =============================================================================
 * Input guards
 * ============================================================================= */

#[inline]
fn ensure_finite_value(value: f64) -> TdResult<()> {
    if !value.is_finite() {
        return Err(TdError::InvalidArgument {
            context: "sample value (NaN or ±inf)",
        });
    }
    Ok(())
}

#[inline]
fn checked_weight(weight: i64) -> TdResult<u64> {
    if weight < 1 {
        return Err(TdError::Overflow {
            context: "sample weight must be >= 1",
        });
    }
    Ok(weight as u64)
}

#[inline]
fn checked_total(total: u64, extra: u64) -> TdResult<u64> {
    total.checked_add(extra).ok_or(TdError::Overflow {
        context: "total weight exceeds u64",
    })
}

/* =============================================================================
 * Digest
 * ============================================================================= */

/// Streaming t-digest: an ascending centroid store plus a buffer of pending raw points.
///
/// Invariants:
/// - centroids are ascending by mean;
/// - `processed_weight` is the summed centroid weight;
/// - `total_weight = processed_weight + pending weight`.
///
/// Reads that need the store (`quantile`, `cdf`, `to_json`, `centroids`) fold the buffer
/// in first and therefore take `&mut self`. Equality folds into a temporary instead.
#[derive(Debug, Clone)]
pub struct TDigest {
    config: DigestConfig,
    centroids: Vec<Centroid>,
    phase: Phase,
    total_weight: u64,
    processed_weight: u64,
}

impl Default for TDigest {
    fn default() -> Self {
        Self::empty(DigestConfig::default())
    }
}

impl TDigest {
    #[inline]
    fn empty(config: DigestConfig) -> Self {
        Self {
            config,
            centroids: Vec::new(),
            phase: Phase::Materialized,
            total_weight: 0,
            processed_weight: 0,
        }
    }

    /// Empty digest with default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point for fluent construction.
    #[inline]
    pub fn builder() -> TDigestBuilder {
        TDigestBuilder::default()
    }

    pub fn with_config(config: DigestConfig) -> TdResult<Self> {
        Self::builder().config(config).build()
    }

    /// Build from values, each with weight 1. Rejects the whole batch on any NaN/±inf.
    pub fn from_values(values: &[f64]) -> TdResult<Self> {
        let mut td = Self::default();
        td.add_many(values)?;
        Ok(td)
    }

    pub fn from_values_with(values: &[f64], config: DigestConfig) -> TdResult<Self> {
        let mut td = Self::with_config(config)?;
        td.add_many(values)?;
        Ok(td)
    }

    /// Materialized digest from a validated store (codec path).
    pub(crate) fn from_parts(config: DigestConfig, centroids: Vec<Centroid>, total_weight: u64) -> Self {
        Self {
            config,
            centroids,
            phase: Phase::Materialized,
            total_weight,
            processed_weight: total_weight,
        }
    }

    /* ===========================
     * Introspection
     * =========================== */

    #[inline]
    pub fn config(&self) -> DigestConfig {
        self.config
    }
    #[inline]
    pub fn compression(&self) -> f64 {
        self.config.compression
    }
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        self.config.buffer_capacity
    }
    #[inline]
    pub fn max_centroids(&self) -> usize {
        self.config.max_centroids
    }

    /// Total weight ever added (the digest's length).
    #[inline]
    pub fn len(&self) -> u64 {
        self.total_weight
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }
    #[inline]
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }
    /// Weight already folded into centroids.
    #[inline]
    pub fn processed_weight(&self) -> u64 {
        self.processed_weight
    }
    /// Number of raw points waiting in the buffer.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.phase.pending_len()
    }
    #[inline]
    pub fn pending_weight(&self) -> u64 {
        self.phase.pending_weight()
    }

    /// The centroid store, after folding in any pending points.
    pub fn centroids(&mut self) -> &[Centroid] {
        self.compress();
        &self.centroids
    }

    /* ===========================
     * Ingest
     * =========================== */

    #[inline]
    pub fn add(&mut self, value: f64) -> TdResult<()> {
        self.add_weighted(value, 1)
    }

    /// Add `value` with an integer `weight ≥ 1`. Nothing changes on error.
    pub fn add_weighted(&mut self, value: f64, weight: i64) -> TdResult<()> {
        ensure_finite_value(value)?;
        let weight = checked_weight(weight)?;
        let total = checked_total(self.total_weight, weight)?;
        self.push_point(Centroid::new(value, weight), total);
        Ok(())
    }

    /// Add every value with weight 1. The batch is validated before anything is added.
    pub fn add_many(&mut self, values: &[f64]) -> TdResult<()> {
        values.iter().try_for_each(|&v| ensure_finite_value(v))?;
        checked_total(self.total_weight, values.len() as u64)?;
        for &v in values {
            self.push_point(Centroid::new(v, 1), self.total_weight + 1);
        }
        Ok(())
    }

    /// Weighted batch; all-or-nothing like [`TDigest::add_many`].
    pub fn add_weighted_many(&mut self, points: &[(f64, i64)]) -> TdResult<()> {
        let mut batch = Vec::with_capacity(points.len());
        let mut total = self.total_weight;
        for &(v, w) in points {
            ensure_finite_value(v)?;
            let w = checked_weight(w)?;
            total = checked_total(total, w)?;
            batch.push(Centroid::new(v, w));
        }
        for point in batch {
            self.push_point(point, self.total_weight + point.weight());
        }
        Ok(())
    }

    #[inline]
    fn push_point(&mut self, point: Centroid, new_total: u64) {
        self.total_weight = new_total;
        if self.phase.push(point) > self.config.buffer_capacity {
            self.compress();
        }
    }

    /// Drop all data; configuration is kept.
    pub fn clear(&mut self) {
        self.centroids.clear();
        self.phase = Phase::Materialized;
        self.total_weight = 0;
        self.processed_weight = 0;
    }

    /// Deep, independent copy.
    #[inline]
    pub fn copy(&self) -> TDigest {
        self.clone()
    }

    /* ===========================
     * Materialization
     * =========================== */

    /// Fold pending points into the centroid store. No-op when nothing is pending.
    pub fn compress(&mut self) {
        let Some(buffer) = self.phase.take_pending() else {
            return;
        };
        let stream = MergeByMean::new(std::mem::take(&mut self.centroids), buffer.into_sorted());
        self.centroids = compress_into(stream, self.total_weight, &self.config);
        self.processed_weight = self.total_weight;
    }

    /// The store `compress` would produce, without mutating `self`.
    pub(crate) fn materialized(&self) -> Cow<'_, [Centroid]> {
        match &self.phase {
            Phase::Materialized => Cow::Borrowed(&self.centroids),
            Phase::Pending(buffer) => {
                let stream = MergeByMean::new(self.centroids.iter().copied(), buffer.sorted());
                Cow::Owned(compress_into(stream, self.total_weight, &self.config))
            }
        }
    }

    /* ===========================
     * Merging
     * =========================== */

    /// Fold `other` into `self` at centroid granularity: each of `other`'s centroids is an
    /// indivisible unit, and the combined run goes through the compressor with `self`'s
    /// configuration. Cost depends on centroid counts, not on stream lengths.
    pub fn update_digest(&mut self, other: &TDigest) -> TdResult<()> {
        let total = checked_total(self.total_weight, other.total_weight)?;
        let theirs = other.materialized();
        self.compress();
        if theirs.is_empty() {
            return Ok(());
        }

        let ours = std::mem::take(&mut self.centroids);
        ttrace!(
            left = ours.len(),
            right = theirs.len(),
            total_weight = total,
            "tdigest: merge digests"
        );
        let stream = MergeByMean::new(ours, theirs.iter().copied());
        self.centroids = compress_into(stream, total, &self.config);
        self.total_weight = total;
        self.processed_weight = total;
        Ok(())
    }

    /// Merge a set of digests; the result uses the first digest's configuration.
    pub fn merge_digests(digests: &[TDigest]) -> TdResult<TDigest> {
        let Some((first, rest)) = digests.split_first() else {
            return Ok(TDigest::default());
        };
        let mut acc = first.clone();
        for d in rest {
            acc.update_digest(d)?;
        }
        Ok(acc)
    }
}

/// Structural equality on the materialized state: compression, ordered centroids,
/// total weight. Buffer and capacity settings do not take part.
impl PartialEq for TDigest {
    fn eq(&self, other: &Self) -> bool {
        self.config.compression == other.config.compression
            && self.total_weight == other.total_weight
            && self.materialized() == other.materialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn means(td: &mut TDigest) -> Vec<f64> {
        td.centroids().iter().map(|c| c.mean()).collect()
    }

    #[test]
    fn defaults_and_empty_state() {
        let td = TDigest::new();
        assert!(td.is_empty());
        assert_eq!(td.len(), 0);
        assert_eq!(td.processed_weight(), 0);
        assert_eq!(td.pending_len(), 0);
        assert_eq!(td.compression(), 0.01);
        assert_eq!(td.buffer_capacity(), 2048);
        assert_eq!(td.max_centroids(), 2048);
    }

    #[test]
    fn builder_validates_config() {
        assert!(TDigest::builder().compression(0.0).build().is_err());
        assert!(TDigest::builder().compression(f64::NAN).build().is_err());
        assert!(TDigest::builder().compression(f64::INFINITY).build().is_err());
        assert!(TDigest::builder().buffer_capacity(0).build().is_err());
        assert!(TDigest::builder().max_centroids(2).build().is_err());

        let td = TDigest::builder()
            .compression(0.05)
            .buffer_capacity(16)
            .max_centroids(64)
            .build()
            .expect("valid config");
        assert_eq!(
            td.config(),
            DigestConfig {
                compression: 0.05,
                buffer_capacity: 16,
                max_centroids: 64
            }
        );
    }

    #[test]
    fn add_buffers_until_capacity_is_exceeded() {
        let mut td = TDigest::builder().buffer_capacity(4).build().expect("config");
        for i in 0..4 {
            td.add(i as f64).expect("finite");
        }
        assert_eq!(td.pending_len(), 4);
        assert_eq!(td.processed_weight(), 0);
        assert_eq!(td.len(), 4);

        assert_eq!(td.pending_weight() + td.processed_weight(), td.len());
        td.add(4.0).expect("finite");
        assert_eq!(td.pending_len(), 0, "fifth point triggers compress");
        assert_eq!(td.pending_weight(), 0);
        assert_eq!(td.processed_weight(), 5);
        assert_eq!(td.len(), 5);
    }

    #[test]
    fn failed_adds_leave_state_untouched() {
        let mut td = TDigest::from_values(&[1.0, 2.0]).expect("finite");

        let err = td.add(f64::NAN).expect_err("nan rejected");
        assert!(matches!(err, TdError::InvalidArgument { .. }));
        assert!(td.add(f64::NEG_INFINITY).is_err());

        let err = td.add_weighted(3.0, -1).expect_err("negative weight");
        assert!(matches!(err, TdError::Overflow { .. }));
        assert!(matches!(
            td.add_weighted(3.0, 0),
            Err(TdError::Overflow { .. })
        ));

        assert!(td.add_many(&[4.0, f64::NAN, 5.0]).is_err());
        assert!(td.add_weighted_many(&[(4.0, 2), (5.0, 0)]).is_err());
        assert_eq!(td.len(), 2);
        assert_eq!(td.pending_len(), 2);
        assert_eq!(means(&mut td), vec![1.0, 2.0]);
    }

    #[test]
    fn total_weight_overflow_is_reported() {
        let mut td = TDigest::new();
        td.add_weighted(1.0, i64::MAX).expect("fits");
        td.add_weighted(2.0, i64::MAX).expect("fits");
        let err = td.add_weighted(3.0, 2).expect_err("overflow");
        assert!(matches!(err, TdError::Overflow { .. }));
        assert_eq!(td.len(), 2 * (i64::MAX as u64));

        let mut other = TDigest::new();
        other.add_weighted(0.0, 2).expect("fits");
        assert!(matches!(
            td.update_digest(&other),
            Err(TdError::Overflow { .. })
        ));
        assert_eq!(td.len(), 2 * (i64::MAX as u64));
    }

    #[test]
    fn weighted_add_counts_towards_length() {
        let mut td = TDigest::from_values(&[1.0, 2.0, 3.0]).expect("finite");
        td.add_weighted(3.0, 2).expect("weight 2");
        assert_eq!(td.len(), 5);
        td.add_weighted_many(&[(7.0, 3), (8.0, 1)]).expect("batch");
        assert_eq!(td.len(), 9);
        let w: u64 = td.centroids().iter().map(|c| c.weight()).sum();
        assert_eq!(w, 9);
        assert_eq!(td.processed_weight(), 9);
    }

    #[test]
    fn clear_resets_data_but_keeps_config() {
        let mut td = TDigest::builder().compression(0.02).build().expect("config");
        td.add_many(&[1.0, 2.0, 3.0]).expect("finite");
        td.compress();
        td.add(4.0).expect("finite");
        td.clear();
        assert!(td.is_empty());
        assert_eq!(td.pending_len(), 0);
        assert!(td.centroids().is_empty());
        assert_eq!(td.compression(), 0.02);
    }

    #[test]
    fn copy_is_independent() {
        let mut a = TDigest::from_values(&[1.0, 2.0, 3.0]).expect("finite");
        let b = a.copy();
        assert_eq!(a, b);
        a.add(4.0).expect("finite");
        assert_ne!(a, b);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn equality_is_structural_and_ignores_buffer_state() {
        let mut a = TDigest::from_values(&[3.0, 1.0, 2.0]).expect("finite");
        let b = TDigest::from_values(&[1.0, 2.0, 3.0]).expect("finite");
        assert_eq!(a, b, "pending on both sides");
        a.compress();
        assert_eq!(a, b, "materialized vs pending");

        let c = TDigest::from_values(&[1.0, 2.0, 4.0]).expect("finite");
        assert_ne!(a, c);

        let d = TDigest::from_values_with(
            &[1.0, 2.0, 3.0],
            DigestConfig {
                compression: 0.02,
                ..DigestConfig::default()
            },
        )
        .expect("finite");
        assert_ne!(b, d, "compression takes part in equality");

        assert_eq!(TDigest::new(), TDigest::new());
    }

    #[test]
    fn update_digest_sums_lengths_and_keeps_self_config() {
        let mut a = TDigest::builder().compression(0.02).build().expect("config");
        a.add_many(&[1.0, 2.0, 3.0]).expect("finite");
        let b = TDigest::from_values(&[4.0, 5.0]).expect("finite");

        a.update_digest(&b).expect("merge");
        assert_eq!(a.len(), 5);
        assert_eq!(a.processed_weight(), 5);
        assert_eq!(a.compression(), 0.02);
        assert_eq!(means(&mut a), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(b.pending_len(), 2, "other is read, not mutated");

        let empty = TDigest::new();
        a.update_digest(&empty).expect("merge empty");
        assert_eq!(a.len(), 5);

        let mut e = TDigest::new();
        e.update_digest(&a).expect("merge into empty");
        assert_eq!(e.len(), 5);
        assert_eq!(means(&mut e), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn merge_digests_folds_all_inputs() {
        let parts: Vec<TDigest> = (0..4)
            .map(|k| {
                let xs: Vec<f64> = (0..100).map(|i| (k * 100 + i) as f64).collect();
                TDigest::from_values(&xs).expect("finite")
            })
            .collect();
        let mut merged = TDigest::merge_digests(&parts).expect("merge");
        assert_eq!(merged.len(), 400);
        let cs = merged.centroids();
        assert_eq!(cs[0].mean(), 0.0);
        assert_eq!(cs[cs.len() - 1].mean(), 399.0);

        let none = TDigest::merge_digests(&[]).expect("empty input");
        assert!(none.is_empty());
    }

    #[test]
    fn coarse_fold_of_opposite_extremes_keeps_the_true_mean() {
        let mut td = TDigest::builder().compression(10.0).build().expect("valid");
        td.add_many(&[-1e308, -1e308, 1e308, 1e308]).expect("finite");
        let cs: Vec<(f64, u64)> = td.centroids().iter().map(|c| (c.mean(), c.weight())).collect();
        assert_eq!(cs, vec![(-1e308, 1), (0.0, 2), (1e308, 1)]);
        assert_eq!(td.quantile(0.5), 0.0);
    }

    #[test]
    fn digests_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TDigest>();
    }
}
