//! Iterate the records of an in-memory capture file.
use crate::error::DecodeError;
use crate::record::{RECORD_SIZE, TickRecord};

/// Slices a byte buffer into consecutive [`RECORD_SIZE`] windows and decodes
/// each one.
///
/// Items are `(offset, result)`: a bad window is reported at its byte offset
/// and iteration continues, so the caller picks between aborting and skipping.
/// Iteration ends once fewer than [`RECORD_SIZE`] bytes are left; see
/// [`TickStream::remainder`].
#[derive(Debug, Clone)]
pub struct TickStream<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> TickStream<'a> {
    /// Records start at the first byte.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Skip an opaque header of `header_len` bytes first.
    pub fn with_header(buffer: &'a [u8], header_len: usize) -> Self {
        Self { buffer, offset: header_len.min(buffer.len()) }
    }

    /// Byte offset of the next window.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left over that do not make a whole record.
    pub fn remainder(&self) -> &'a [u8] {
        let rest = &self.buffer[self.offset..];
        &rest[rest.len() - rest.len() % RECORD_SIZE..]
    }
}

impl<'a> Iterator for TickStream<'a> {
    type Item = (usize, Result<TickRecord, DecodeError>);

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.offset.checked_add(RECORD_SIZE)?;
        if end > self.buffer.len() {
            return None;
        }
        let at = self.offset;
        self.offset = end;
        Some((at, TickRecord::decode(&self.buffer[at..end])))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.buffer.len() - self.offset) / RECORD_SIZE;
        (n, Some(n))
    }
}

impl ExactSizeIterator for TickStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FILE_HEADER_SIZE, RecordKind};

    fn record(kind: u8, qty: u64) -> [u8; RECORD_SIZE] {
        let mut b = [0u8; RECORD_SIZE];
        b[16] = kind;
        b[17] = b'B';
        b[18..26].copy_from_slice(&qty.to_le_bytes());
        b[26..34].copy_from_slice(&100.25f64.to_le_bytes());
        b
    }

    #[test]
    fn skips_header_and_yields_offsets() {
        let mut file = vec![0xEE; FILE_HEADER_SIZE];
        file.extend_from_slice(&record(0, 1));
        file.extend_from_slice(&record(2, 2));
        let out: Vec<_> = TickStream::with_header(&file, FILE_HEADER_SIZE).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, 16);
        assert_eq!(out[1].0, 50);
        let second = out[1].1.as_ref().unwrap();
        assert_eq!(second.kind, RecordKind::Trade);
        assert_eq!(second.quantity, 2);
    }

    #[test]
    fn bad_record_does_not_stop_iteration() {
        let mut file = Vec::new();
        file.extend_from_slice(&record(9, 1));
        file.extend_from_slice(&record(1, 2));
        let mut stream = TickStream::new(&file);
        assert!(matches!(stream.next(), Some((0, Err(DecodeError::UnknownKind(9))))));
        assert!(matches!(stream.next(), Some((34, Ok(_)))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn trailing_partial_record_is_left_over() {
        let mut file = record(1, 5).to_vec();
        file.extend_from_slice(&[1, 2, 3]);
        let mut stream = TickStream::new(&file);
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.remainder(), &[1, 2, 3]);
        assert!(stream.next().is_some());
        assert!(stream.next().is_none());
        assert_eq!(stream.remainder(), &[1, 2, 3]);
    }

    #[test]
    fn header_longer_than_buffer_is_empty() {
        let file = [0u8; 8];
        let mut stream = TickStream::with_header(&file, FILE_HEADER_SIZE);
        assert!(stream.next().is_none());
        assert!(stream.remainder().is_empty());
    }
}
