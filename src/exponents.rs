//! Per provider/pair decimal exponents for quantity rendering.
//!
//! The table is filled once from instrument metadata and only read
//! afterwards. There is no internal locking: finish ingestion before sharing
//! it (e.g. behind an `Arc`) with concurrent readers.
use std::collections::HashMap;

use crate::decimal::exponent_in_range;
use crate::error::ParseError;

/// Exponent returned when a provider or pair is unknown.
pub const DEFAULT_EXPONENT: i32 = -8;

/// An `(provider, pair, exponent text)` entry that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub provider: String,
    pub pair: String,
    pub error: ParseError,
}

#[derive(Debug, Default, Clone)]
pub struct ExponentTable {
    storage: HashMap<String, HashMap<String, i32>>,
}

impl ExponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the exponent for `(provider, pair)`.
    pub fn set(&mut self, provider: &str, pair: &str, exponent: i32) {
        self.storage
            .entry(provider.to_owned())
            .or_default()
            .insert(pair.to_owned(), exponent);
    }

    /// Store the exponent of a scientific-notation string such as `"1E-08"`.
    ///
    /// Only the part after the `E` marker is used; the mantissa is ignored.
    /// On error the table is left untouched.
    pub fn set_from_string(&mut self, provider: &str, pair: &str, raw: &str) -> Result<(), ParseError> {
        let exponent = parse_exponent(raw)?;
        self.set(provider, pair, exponent);
        Ok(())
    }

    /// Returns `(exponent, found)`. Misses return [`DEFAULT_EXPONENT`] with
    /// `found == false`.
    pub fn get(&self, provider: &str, pair: &str) -> (i32, bool) {
        match self.find(provider, pair) {
            Some(exp) => (exp, true),
            None => (DEFAULT_EXPONENT, false),
        }
    }

    pub fn find(&self, provider: &str, pair: &str) -> Option<i32> {
        self.storage.get(provider)?.get(pair).copied()
    }

    /// Apply [`Self::set_from_string`] to every entry, collecting failures
    /// instead of stopping at the first one.
    pub fn ingest<I, P, Q, R>(&mut self, entries: I) -> Vec<RejectedEntry>
    where
        I: IntoIterator<Item = (P, Q, R)>,
        P: AsRef<str>,
        Q: AsRef<str>,
        R: AsRef<str>,
    {
        let mut rejected = Vec::new();
        for (provider, pair, raw) in entries {
            let (provider, pair) = (provider.as_ref(), pair.as_ref());
            if let Err(error) = self.set_from_string(provider, pair, raw.as_ref()) {
                rejected.push(RejectedEntry { provider: provider.to_owned(), pair: pair.to_owned(), error });
            }
        }
        rejected
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.storage.keys().map(String::as_str)
    }

    /// Number of `(provider, pair)` entries.
    pub fn len(&self) -> usize {
        self.storage.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `"<mantissa>E<signed int>"` -> the signed int. The marker may be lower case.
/// Exponents beyond [`crate::decimal::MAX_EXPONENT`] are rejected.
fn parse_exponent(raw: &str) -> Result<i32, ParseError> {
    let invalid = || ParseError::InvalidExponent(raw.to_owned());
    let (mantissa, exponent) = raw.trim().split_once(['E', 'e']).ok_or_else(invalid)?;
    if mantissa.is_empty() {
        return Err(invalid());
    }
    let exponent: i32 = exponent.parse().map_err(|_| invalid())?;
    if !exponent_in_range(exponent) {
        return Err(invalid());
    }
    Ok(exponent)
}
