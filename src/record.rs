//! Fixed-layout L2 tick record.
//!
//! Every record is exactly [`RECORD_SIZE`] bytes, little-endian, no padding:
//!
//! | field              | offset | len |
//! |--------------------|--------|-----|
//! | exchange timestamp | 0      | 8   |
//! | receive timestamp  | 8      | 8   |
//! | record type        | 16     | 1   |
//! | side               | 17     | 1   |
//! | quantity           | 18     | 8   |
//! | price (f64 bits)   | 26     | 8   |
//!
//! Timestamps are nanoseconds counted from an epoch 30 years before 1970;
//! decoding adds them to the Unix epoch and then moves the calendar date
//! forward by [`TIMESTAMP_OFFSET_YEARS`].
use std::fmt;

use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

use crate::decimal::{exponent_in_range, format_scaled};
use crate::error::DecodeError;

const TS_EXCHANGE_OFFSET: usize = 0;
const TS_RECEIVE_OFFSET: usize = 8;
const TYPE_OFFSET: usize = 16;
const SIDE_OFFSET: usize = 17;
const SIZE_OFFSET: usize = 18;
const PRICE_OFFSET: usize = 26;

/// Size in bytes of one encoded record.
pub const RECORD_SIZE: usize = 34;

/// Size of the opaque header that precedes the records of a capture file.
pub const FILE_HEADER_SIZE: usize = 16;

/// Calendar years added to every decoded timestamp to compensate for the
/// feed's epoch.
pub const TIMESTAMP_OFFSET_YEARS: i32 = 30;

/// Column names of [`TickRecord::to_row`].
pub const CSV_HEADER: [&str; 6] = ["TsExchangeUTC", "TsReceiveUTC", "Type", "Side", "Size", "Price"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordKind {
    Reset = 0,
    Update = 1,
    Trade = 2,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Reset => "reset",
            RecordKind::Update => "update",
            RecordKind::Trade => "trade",
        }
    }
}

impl TryFrom<u8> for RecordKind {
    type Error = DecodeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(RecordKind::Reset),
            1 => Ok(RecordKind::Update),
            2 => Ok(RecordKind::Trade),
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bid,
    Ask,
    /// Tagged `'U'` or `0` on the wire.
    Unknown,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
            Side::Unknown => "unknown",
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = DecodeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            b'B' => Ok(Side::Bid),
            b'A' => Ok(Side::Ask),
            b'U' | 0 => Ok(Side::Unknown),
            other => Err(DecodeError::UnknownSide(other)),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the quantity column is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityFormat {
    /// Plain integer magnitude.
    Raw,
    /// Exact decimal at the given power-of-ten exponent.
    Scaled(i32),
}

/// One decoded order-book reset/update or trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRecord {
    /// Always UTC.
    pub exchange_ts: OffsetDateTime,
    /// Always UTC. Not checked against `exchange_ts`.
    pub receive_ts: OffsetDateTime,
    pub kind: RecordKind,
    pub side: Side,
    /// Raw integer magnitude; see [`QuantityFormat`] for rendering.
    pub quantity: u64,
    pub price: f64,
}

impl TickRecord {
    /// Decode one record. The length is checked before any field is read.
    pub fn decode(buffer: &[u8]) -> Result<Self, DecodeError> {
        let bytes: &[u8; RECORD_SIZE] = buffer.try_into().map_err(|_| DecodeError::BadLength {
            expected: RECORD_SIZE,
            actual: buffer.len(),
        })?;

        Ok(TickRecord {
            exchange_ts: feed_timestamp(read_u64(bytes, TS_EXCHANGE_OFFSET))?,
            receive_ts: feed_timestamp(read_u64(bytes, TS_RECEIVE_OFFSET))?,
            kind: RecordKind::try_from(bytes[TYPE_OFFSET])?,
            side: Side::try_from(bytes[SIDE_OFFSET])?,
            quantity: read_u64(bytes, SIZE_OFFSET),
            price: f64::from_bits(read_u64(bytes, PRICE_OFFSET)),
        })
    }

    /// Render the six CSV fields in [`CSV_HEADER`] order.
    pub fn to_row(&self, quantity: QuantityFormat) -> Result<[String; 6], DecodeError> {
        let size = match quantity {
            QuantityFormat::Raw => self.quantity.to_string(),
            QuantityFormat::Scaled(exp) if exponent_in_range(exp) => format_scaled(self.quantity, exp),
            QuantityFormat::Scaled(exp) => return Err(DecodeError::ExponentOutOfRange(exp)),
        };
        Ok([
            self.exchange_ts.format(&Rfc3339)?,
            self.receive_ts.format(&Rfc3339)?,
            self.kind.label().to_owned(),
            self.side.label().to_owned(),
            size,
            // Display for f64 is the shortest string that parses back exactly.
            self.price.to_string(),
        ])
    }
}

/// Shorthand for [`TickRecord::decode`].
pub fn decode(buffer: &[u8]) -> Result<TickRecord, DecodeError> {
    TickRecord::decode(buffer)
}

fn read_u64(bytes: &[u8; RECORD_SIZE], offset: usize) -> u64 {
    let mut tmp = [0u8; 8];
    tmp.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(tmp)
}

fn feed_timestamp(nanos: u64) -> Result<OffsetDateTime, DecodeError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .ok()
        .and_then(|ts| add_years(ts, TIMESTAMP_OFFSET_YEARS))
        .ok_or(DecodeError::TimestampOutOfRange(nanos))
}

/// Move the calendar date by whole years, keeping the time of day.
/// Feb 29 landing on a non-leap year rolls over to Mar 1.
fn add_years(ts: OffsetDateTime, years: i32) -> Option<OffsetDateTime> {
    let date = ts.date();
    let year = date.year().checked_add(years)?;
    let shifted = match Date::from_calendar_date(year, date.month(), date.day()) {
        Ok(d) => d,
        Err(_) => Date::from_calendar_date(year, Month::March, 1).ok()?,
    };
    Some(ts.replace_date(shifted))
}
