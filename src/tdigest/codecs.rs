// src/tdigest/codecs.rs
//
// Canonical JSON form of a digest: a 4-element array
//
//   [ [compression, buffer_capacity, max_centroids],
//     [ [mean, weight], ... ],        // ascending by mean
//     total_weight,
//     processed_weight ]
//
// e.g. `[[0.01,2048,2048],[[1.0,1],[2.0,1],[3.0,1]],3,3]`.
//
// Encoding always materializes first, so both weights are equal on the wire.
// Decoding validates every structural invariant before a digest is built.

use serde::de::Error as _;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tdigest::centroids::{is_sorted_by_mean, total_weight_of, Centroid};
use crate::tdigest::{DigestConfig, TDigest};
use crate::{TdError, TdResult};

/* ------------------------------ encode ------------------------------ */

struct CentroidSeq<'a>(&'a [Centroid]);

impl Serialize for CentroidSeq<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|c| (c.mean(), c.weight())))
    }
}

impl Serialize for TDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cents = self.materialized();
        let cfg = self.config();
        let mut tup = serializer.serialize_tuple(4)?;
        tup.serialize_element(&(cfg.compression, cfg.buffer_capacity, cfg.max_centroids))?;
        tup.serialize_element(&CentroidSeq(&cents))?;
        tup.serialize_element(&self.total_weight())?;
        // materialized view: processed == total
        tup.serialize_element(&self.total_weight())?;
        tup.end()
    }
}

/* ------------------------------ decode ------------------------------ */

#[derive(Debug, Deserialize)]
struct WireDigest((f64, u64, u64), Vec<(f64, u64)>, u64, u64);

#[inline]
fn malformed(context: &'static str, detail: impl Into<String>) -> TdError {
    TdError::MalformedData {
        context,
        detail: detail.into(),
    }
}

fn wire_usize(v: u64, field: &'static str) -> TdResult<usize> {
    usize::try_from(v).map_err(|_| malformed("digest config", format!("{field}={v} out of range")))
}

impl WireDigest {
    fn into_digest(self) -> TdResult<TDigest> {
        let WireDigest((compression, buffer_capacity, max_centroids), pairs, total, processed) =
            self;

        let config = DigestConfig {
            compression,
            buffer_capacity: wire_usize(buffer_capacity, "buffer_capacity")?,
            max_centroids: wire_usize(max_centroids, "max_centroids")?,
        };
        config
            .validate()
            .map_err(|e| malformed("digest config", e.to_string()))?;

        let mut centroids = Vec::with_capacity(pairs.len());
        for (i, (mean, weight)) in pairs.into_iter().enumerate() {
            if !mean.is_finite() {
                return Err(malformed("centroid", format!("[{i}] mean is not finite")));
            }
            if weight < 1 {
                return Err(malformed("centroid", format!("[{i}] weight must be >= 1")));
            }
            centroids.push(Centroid::new(mean, weight));
        }
        if !is_sorted_by_mean(&centroids) {
            return Err(malformed("centroids", "means are not ascending"));
        }

        let summed = total_weight_of(&centroids)
            .ok_or_else(|| malformed("centroids", "summed weight exceeds u64"))?;
        if summed != processed {
            return Err(malformed(
                "processed weight",
                format!("{processed} != summed centroid weight {summed}"),
            ));
        }
        if total != processed {
            return Err(malformed(
                "total weight",
                format!("{total} != processed weight {processed}"),
            ));
        }

        Ok(TDigest::from_parts(config, centroids, total))
    }
}

impl<'de> Deserialize<'de> for TDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireDigest::deserialize(deserializer)?
            .into_digest()
            .map_err(D::Error::custom)
    }
}

/* ------------------------------ API ------------------------------ */

impl TDigest {
    /// Canonical JSON bytes. Folds pending points in first.
    pub fn to_json(&mut self) -> TdResult<Vec<u8>> {
        self.compress();
        serde_json::to_vec(self).map_err(|_| TdError::Invariant {
            what: "json encoding of a validated digest",
        })
    }

    /// Canonical JSON as a `String`.
    pub fn to_json_string(&mut self) -> TdResult<String> {
        self.compress();
        serde_json::to_string(self).map_err(|_| TdError::Invariant {
            what: "json encoding of a validated digest",
        })
    }

    /// Rebuild a digest from its canonical JSON form.
    ///
    /// Non-UTF-8 input is `InvalidArgument`; anything else that is not a well-formed
    /// digest is `MalformedData`.
    pub fn from_json<T: AsRef<[u8]> + ?Sized>(payload: &T) -> TdResult<TDigest> {
        let text = std::str::from_utf8(payload.as_ref()).map_err(|_| TdError::InvalidArgument {
            context: "json payload is not UTF-8 text",
        })?;
        let wire: WireDigest = serde_json::from_str(text).map_err(|e| {
            tracing::debug!(error = %e, "tdigest: rejected json payload");
            malformed("json payload", e.to_string())
        })?;
        wire.into_digest()
    }
}
