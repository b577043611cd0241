pub mod centroids;
pub mod cdf;
pub mod codecs;
pub mod frontends;
pub mod quantile;
#[cfg(test)]
pub(crate) mod test_helpers;

// Internal building blocks
mod buffer;
mod compressor;
mod merges;
mod scale;
mod tdigest;

// Public surface
pub use centroids::Centroid;
pub use frontends::{Elements, ParseError};
pub use tdigest::{
    DigestConfig, TDigest, TDigestBuilder, DEFAULT_BUFFER_CAPACITY, DEFAULT_COMPRESSION,
    DEFAULT_MAX_CENTROIDS, MIN_MAX_CENTROIDS,
};
