//! Error types surfaced by the library.
//!
//! None of these are logged inside the crate; callers decide whether a
//! failure aborts a whole run or only skips one record/entry.
use std::path::PathBuf;

/// Failure to decode or render a single tick record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("expected buffer size: {expected} actual: {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("undefined record type: {0}")]
    UnknownKind(u8),

    #[error("undefined side: {0}")]
    UnknownSide(u8),

    /// Every `u64` count lands between 2000 and 2584, so `decode` never
    /// returns this; it carries the failure of the fallible `time`
    /// constructors instead of a panic.
    #[error("timestamp {0}ns cannot be represented after the epoch offset")]
    TimestampOutOfRange(u64),

    /// RFC 3339 only fails for years past 9999, which decoded records never
    /// reach; kept so `to_row` propagates the `time` error instead of
    /// unwrapping it.
    #[error("timestamp formatting failed: {0}")]
    TimestampFormat(#[from] time::error::Format),

    #[error("quantity exponent {0} is outside -{max}..={max}", max = crate::decimal::MAX_EXPONENT)]
    ExponentOutOfRange(i32),
}

/// Failure to ingest an exponent expressed in scientific notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid exponent in {0:?}")]
    InvalidExponent(String),
}

/// Failure to derive provider/pair information for a capture file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("parent directory of {0:?} should be in provider.city format, e.g. Bitfinex.london")]
    BadDirectory(PathBuf),

    #[error("{0:?} has no usable file name")]
    BadFileName(PathBuf),
}
