// src/error.rs
use core::fmt;

/// Library-wide error for tdigest-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TdError {
    /// A value or argument the digest cannot accept (NaN/±inf sample, bad config value,
    /// payload that is not text). `context` pinpoints where it came from.
    InvalidArgument { context: &'static str },

    /// Weight below 1, or a weight/total that no longer fits in `u64`.
    Overflow { context: &'static str },

    /// Serialized payload with the wrong shape, arity, field types or broken invariants.
    MalformedData {
        context: &'static str,
        detail: String,
    },

    /// Internal invariant violation (should never happen).
    Invariant { what: &'static str },
}

impl fmt::Display for TdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TdError::InvalidArgument { context } => write!(
                f,
                "tdigest: invalid argument ({}). \
hint: samples must be finite numbers and config values in range",
                context
            ),
            TdError::Overflow { context } => write!(
                f,
                "tdigest: weight overflow ({}). hint: weights must be integers >= 1 \
and the total must fit in u64",
                context
            ),
            TdError::MalformedData { context, detail } => {
                write!(f, "tdigest: malformed data ({}): {}", context, detail)
            }
            TdError::Invariant { what } => {
                write!(f, "tdigest: internal invariant violation: {}", what)
            }
        }
    }
}

impl std::error::Error for TdError {}

pub type TdResult<T> = Result<T, TdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure_kind_and_context() {
        let e = TdError::InvalidArgument {
            context: "sample value",
        };
        let msg = e.to_string();
        assert!(msg.contains("invalid argument"));
        assert!(msg.contains("sample value"));

        let e = TdError::Overflow {
            context: "sample weight",
        };
        assert!(e.to_string().contains("overflow"));

        let e = TdError::MalformedData {
            context: "json payload",
            detail: "invalid length 5".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("malformed"));
        assert!(msg.contains("invalid length 5"));
    }
}
