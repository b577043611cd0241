//! Ingest buffer and the two-phase digest state.
//!
//! A digest is either `Materialized` (every added weight lives in the centroid store)
//! or `Pending` (a non-empty buffer of raw points waits to be folded in). The only
//! transition back is `TDigest::compress`, which every read goes through.

use crate::tdigest::centroids::Centroid;

/// Raw `(value, weight)` points not yet folded into the centroid store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct IngestBuffer {
    points: Vec<Centroid>,
    weight: u64,
}

impl IngestBuffer {
    #[inline]
    pub(crate) fn with_point(point: Centroid) -> Self {
        Self {
            weight: point.weight(),
            points: vec![point],
        }
    }

    /// Append a point; returns the new number of buffered points.
    /// The caller has already checked the digest-wide total, which bounds `weight`.
    #[inline]
    pub(crate) fn push(&mut self, point: Centroid) -> usize {
        self.weight += point.weight();
        self.points.push(point);
        self.points.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub(crate) fn weight(&self) -> u64 {
        self.weight
    }

    /// Points ascending by value. Stable, so equal values keep insertion order.
    pub(crate) fn into_sorted(mut self) -> Vec<Centroid> {
        self.points.sort();
        self.points
    }

    /// Sorted copy for read paths that must not mutate the digest.
    pub(crate) fn sorted(&self) -> Vec<Centroid> {
        self.clone().into_sorted()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum Phase {
    #[default]
    Materialized,
    /// Never holds an empty buffer.
    Pending(IngestBuffer),
}

impl Phase {
    /// Buffer a point, entering `Pending` if needed; returns the buffered count.
    #[inline]
    pub(crate) fn push(&mut self, point: Centroid) -> usize {
        match self {
            Phase::Materialized => {
                *self = Phase::Pending(IngestBuffer::with_point(point));
                1
            }
            Phase::Pending(buffer) => buffer.push(point),
        }
    }

    #[inline]
    pub(crate) fn pending_len(&self) -> usize {
        match self {
            Phase::Materialized => 0,
            Phase::Pending(buffer) => buffer.len(),
        }
    }

    #[inline]
    pub(crate) fn pending_weight(&self) -> u64 {
        match self {
            Phase::Materialized => 0,
            Phase::Pending(buffer) => buffer.weight(),
        }
    }

    /// Leave `Materialized` behind and hand out the buffer, if any.
    #[inline]
    pub(crate) fn take_pending(&mut self) -> Option<IngestBuffer> {
        match std::mem::take(self) {
            Phase::Materialized => None,
            Phase::Pending(buffer) => Some(buffer),
        }
    }
}
