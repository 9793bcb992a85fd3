//! Capture file to CSV conversion.
use std::io::Write;

use anyhow::{Context, Result, bail};

use crate::decimal::exponent_in_range;
use crate::error::DecodeError;
use crate::record::{CSV_HEADER, QuantityFormat};
use crate::stream::TickStream;

/// What to do with a record that fails to decode or render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the whole conversion.
    #[default]
    Abort,
    /// Leave the record out and carry on.
    Skip,
}

#[derive(Debug, Default)]
pub struct ConvertSummary {
    pub rows: usize,
    /// Offset and cause of every record left out under [`ErrorPolicy::Skip`].
    pub skipped: Vec<(usize, DecodeError)>,
    /// Trailing bytes too short to hold a record.
    pub trailing_bytes: usize,
}

/// Write the header line and one row per record of `buffer`.
pub fn write_csv<W: Write>(
    buffer: &[u8],
    header_len: usize,
    quantity: QuantityFormat,
    policy: ErrorPolicy,
    mut out: W,
) -> Result<ConvertSummary> {
    if let QuantityFormat::Scaled(exp) = quantity {
        if !exponent_in_range(exp) {
            return Err(DecodeError::ExponentOutOfRange(exp).into());
        }
    }
    let mut summary = ConvertSummary::default();
    writeln!(out, "{}", CSV_HEADER.join(","))?;

    let mut stream = TickStream::with_header(buffer, header_len);
    for (offset, decoded) in stream.by_ref() {
        match decoded.and_then(|r| r.to_row(quantity)) {
            Ok(row) => {
                writeln!(out, "{}", row.join(","))?;
                summary.rows += 1;
            }
            Err(e) => match policy {
                ErrorPolicy::Abort => bail!("record at offset {offset}: {e}"),
                ErrorPolicy::Skip => summary.skipped.push((offset, e)),
            },
        }
    }
    summary.trailing_bytes = stream.remainder().len();
    out.flush().context("flush csv output")?;
    Ok(summary)
}
