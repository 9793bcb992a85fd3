//! Where exponents and capture identities come from.
//!
//! - [`InstrumentDescriptor`]: the few instrument metadata fields needed to
//!   produce exponent-table entries, read from a JSON array.
//! - [`DataFile`]: provider, city and pair encoded in a capture file path,
//!   e.g. `Bitfinex.london/BTCUSD_2019-01-01.dat.uncompressed`.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::SourceError;

const ISIN_SEPARATOR: &str = "||";
const PROVIDER_SUFFIX: &str = ".MD";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstrumentDescriptor {
    /// `<code>||<Provider>.MD`
    pub isin: String,
    pub base_currency: String,
    pub quote_currency: String,
    /// Scientific notation, e.g. `"1E-08"`.
    pub exchange_lot_size: String,
}

impl InstrumentDescriptor {
    /// `(provider, pair, exponent text)`, or `None` when the ISIN does not
    /// name a provider.
    pub fn exponent_entry(&self) -> Option<(String, String, String)> {
        let mut parts = self.isin.split(ISIN_SEPARATOR);
        let (_, provider) = (parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let provider = provider.strip_suffix(PROVIDER_SUFFIX).unwrap_or(provider);
        let pair = format!("{}{}", self.base_currency, self.quote_currency);
        Some((provider.to_owned(), pair, self.exchange_lot_size.clone()))
    }
}

/// Read a JSON array of instrument descriptors.
pub fn load_descriptors(path: &Path) -> Result<Vec<InstrumentDescriptor>> {
    let text = fs::read_to_string(path).with_context(|| format!("open {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse instruments {path:?}"))
}

/// Identity of a capture file derived from its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub path: PathBuf,
    pub provider: String,
    pub city: String,
    pub pair: String,
}

impl DataFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let dir = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|d| d.to_str())
            .ok_or_else(|| SourceError::BadDirectory(path.clone()))?;
        let (provider, city) = match dir.split('.').collect::<Vec<_>>()[..] {
            [provider, city] => (provider.to_owned(), city.to_owned()),
            _ => return Err(SourceError::BadDirectory(path.clone())),
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SourceError::BadFileName(path.clone()))?;
        let pair = pair_from_file_name(name).to_owned();
        if pair.is_empty() {
            return Err(SourceError::BadFileName(path));
        }
        Ok(Self { path, provider, city, pair })
    }
}

/// Drop everything from the first `_` or `.` that still has an extension
/// after it: `BTCUSD_2019.dat.gz` and `BTCUSD.dat` both give `BTCUSD`.
fn pair_from_file_name(name: &str) -> &str {
    let bytes = name.as_bytes();
    // last '.' that is followed by at least one character
    let Some(last_dot) = bytes.iter().rposition(|&b| b == b'.').and_then(|i| {
        if i + 1 < bytes.len() {
            Some(i)
        } else {
            bytes[..i].iter().rposition(|&b| b == b'.')
        }
    }) else {
        return name;
    };
    let cut = bytes[..=last_dot]
        .iter()
        .position(|&b| b == b'_' || b == b'.')
        .unwrap_or(last_dot);
    &name[..cut]
}
