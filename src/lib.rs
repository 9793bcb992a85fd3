//! Reader for fixed-layout L2 market-data captures.
//!
//! This crate provides the core types used by the `l2_ticks` CSV converter
//! and the `exponent_lookup` tool:
//!
//! - `record`: the 34-byte tick record layout and its decoder
//! - `stream`: iteration over the records of a whole capture file
//! - `decimal`: exact scaled-integer to decimal string rendering
//! - `exponents`: provider/pair exponent table fed from instrument metadata
//! - `instruments`: instrument descriptors and capture file naming
//! - `convert`: capture file to CSV with an abort/skip error policy
//!
//! Nothing in the library logs; errors are returned to the caller, which
//! decides whether a bad record or metadata entry aborts the run.
pub mod convert;
pub mod decimal;
pub mod error;
pub mod exponents;
pub mod instruments;
pub mod record;
pub mod stream;

pub use error::{DecodeError, ParseError, SourceError};
pub use exponents::{DEFAULT_EXPONENT, ExponentTable};
pub use record::{QuantityFormat, RecordKind, Side, TickRecord};
pub use stream::TickStream;
