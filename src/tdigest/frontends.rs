// src/tdigest/frontends.rs
//! Shared helpers for hosts that drive a digest with loosely typed input: named
//! configuration options and the mixed element lists accepted by `update`/`union`.

use std::fmt::{Display, Formatter};

use crate::tdigest::{DigestConfig, TDigest};
use crate::{TdError, TdResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnknownOption(String),
    InvalidValue { option: &'static str, value: f64 },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnknownOption(s) => write!(
                f,
                "unknown option: {s} (expected 'compression', 'buffer_capacity' or 'max_centroids')"
            ),
            ParseError::InvalidValue { option, value } => {
                write!(f, "{option} expects a non-negative integer (got {value})")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for TdError {
    fn from(value: ParseError) -> Self {
        tracing::debug!(error = %value, "tdigest: rejected configuration option");
        TdError::InvalidArgument {
            context: "configuration option",
        }
    }
}

/// Lowercase/normalize a free-form string by removing `_`, `-` and spaces.
#[inline]
fn norm(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "")
}

fn integral(option: &'static str, value: f64) -> Result<usize, ParseError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(ParseError::InvalidValue { option, value });
    }
    Ok(value as usize)
}

/* ----------------------- configuration options ----------------------- */

impl DigestConfig {
    /// Set one option by name. Names are case-insensitive and ignore `_`/`-`.
    /// Range checks happen in [`DigestConfig::validate`].
    pub fn with_option(mut self, name: &str, value: f64) -> Result<Self, ParseError> {
        match norm(name).as_str() {
            "compression" | "delta" => self.compression = value,
            "buffercapacity" | "buffer" => {
                self.buffer_capacity = integral("buffer_capacity", value)?
            }
            "maxcentroids" | "maxsize" => {
                self.max_centroids = integral("max_centroids", value)?
            }
            _ => return Err(ParseError::UnknownOption(name.to_string())),
        }
        Ok(self)
    }

    /// Defaults overridden by `options`, then validated.
    pub fn from_options<'a, I>(options: I) -> TdResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut config = DigestConfig::default();
        for (name, value) in options {
            config = config.with_option(name, value)?;
        }
        config.validate()?;
        Ok(config)
    }
}

impl TDigest {
    /// Empty digest configured from named options.
    pub fn with_options<'a, I>(options: I) -> TdResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        TDigest::with_config(DigestConfig::from_options(options)?)
    }
}

/* ----------------------- mixed element lists ----------------------- */

/// One argument of [`TDigest::update`] / [`TDigest::union`].
#[derive(Debug, Clone, Copy)]
pub enum Elements<'a> {
    /// Unit-weight values.
    Values(&'a [f64]),
    /// `(value, weight)` pairs.
    Weighted(&'a [(f64, i64)]),
    /// Another digest, merged at centroid granularity.
    Digest(&'a TDigest),
}

impl<'a> From<&'a [f64]> for Elements<'a> {
    fn from(values: &'a [f64]) -> Self {
        Elements::Values(values)
    }
}

impl<'a, const N: usize> From<&'a [f64; N]> for Elements<'a> {
    fn from(values: &'a [f64; N]) -> Self {
        Elements::Values(values)
    }
}

impl<'a> From<&'a Vec<f64>> for Elements<'a> {
    fn from(values: &'a Vec<f64>) -> Self {
        Elements::Values(values)
    }
}

impl<'a> From<&'a [(f64, i64)]> for Elements<'a> {
    fn from(points: &'a [(f64, i64)]) -> Self {
        Elements::Weighted(points)
    }
}

impl<'a> From<&'a TDigest> for Elements<'a> {
    fn from(digest: &'a TDigest) -> Self {
        Elements::Digest(digest)
    }
}

impl TDigest {
    fn update_one(&mut self, element: Elements<'_>) -> TdResult<()> {
        match element {
            Elements::Values(values) => self.add_many(values),
            Elements::Weighted(points) => self.add_weighted_many(points),
            Elements::Digest(digest) => self.update_digest(digest),
        }
    }

    /// Add every element in order. All-or-nothing: on error `self` is unchanged.
    pub fn update(&mut self, elements: &[Elements<'_>]) -> TdResult<()> {
        if let [only] = elements {
            return self.update_one(*only);
        }
        let mut next = self.clone();
        for &element in elements {
            next.update_one(element)?;
        }
        *self = next;
        Ok(())
    }

    /// New digest holding `self` plus every element; `self` is not touched.
    pub fn union(&self, elements: &[Elements<'_>]) -> TdResult<TDigest> {
        let mut out = self.clone();
        for &element in elements {
            out.update_one(element)?;
        }
        Ok(out)
    }
}
