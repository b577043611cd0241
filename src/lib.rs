//! Streaming, mergeable t-digest.
//!
//! Observations are buffered and folded into an ascending list of centroids under an
//! arcsine scale bound, which keeps memory at `O(1/δ)` while giving the tails the finest
//! resolution. Digests merge at centroid granularity and round-trip through a canonical
//! JSON form.
//!
//! ```
//! use tdigest_stream::TDigest;
//!
//! let mut digest = TDigest::from_values(&[1.0, 2.0, 3.0]).unwrap();
//! assert_eq!(digest.len(), 3);
//! assert_eq!(digest.quantile(0.5), 2.0);
//! ```

// Opt-in diagnostics; the host installs a `tracing` subscriber if it wants them.
macro_rules! ttrace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    }
}

mod error;
pub mod tdigest;

pub use error::{TdError, TdResult};
pub use tdigest::{Centroid, DigestConfig, Elements, ParseError, TDigest, TDigestBuilder};
