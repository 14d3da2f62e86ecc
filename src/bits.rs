//! Bit-granular writing and reading over byte streams.
//!
//! Bits are packed most significant first: the first bit pushed lands in
//! bit 7 of the first byte.

use std::io::{self, Read, Write};
use std::iter::Peekable;

use crate::code::Code;

/// Packs single bits into bytes written to an inner sink.
pub struct BitWriter<W: Write> {
    inner: W,
    buf: u8,
    filled: u8,
    last_byte_bits: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer with an empty accumulator.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: 0,
            filled: 0,
            last_byte_bits: 0,
            bytes_written: 0,
        }
    }

    /// Append one bit, emitting the accumulator once it holds eight.
    pub fn push_bit(&mut self, bit: bool) -> io::Result<()> {
        self.buf |= (bit as u8) << (7 - self.filled);
        self.filled += 1;
        if self.filled == 8 {
            self.emit()?;
        }
        Ok(())
    }

    /// Append every bit of `code`.
    pub fn push_code(&mut self, code: &Code) -> io::Result<()> {
        for &bit in code.bits() {
            self.push_bit(bit)?;
        }
        Ok(())
    }

    /// Flush any pending bits, then write whole bytes unchanged.
    pub fn write_aligned(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.flush()?;
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        if !bytes.is_empty() {
            self.last_byte_bits = 8;
        }
        Ok(())
    }

    /// Zero-pad and emit a partially filled byte.
    ///
    /// Returns whether a byte was written. With nothing pending this does
    /// nothing, so repeated calls never emit duplicate bytes.
    pub fn flush(&mut self) -> io::Result<bool> {
        if self.filled == 0 {
            return Ok(false);
        }
        self.emit()?;
        Ok(true)
    }

    fn emit(&mut self) -> io::Result<()> {
        self.inner.write_all(&[self.buf])?;
        self.bytes_written += 1;
        self.last_byte_bits = self.filled;
        self.buf = 0;
        self.filled = 0;
        Ok(())
    }

    /// Meaningful bits in the most recently emitted byte: 1..=8, or 0 if
    /// nothing has been emitted yet.
    pub fn last_byte_bits(&self) -> u8 {
        self.last_byte_bits
    }

    /// Bits accumulated but not yet emitted.
    pub fn pending_bits(&self) -> u8 {
        self.filled
    }

    /// Bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Return the inner sink. Pending bits that were not flushed are dropped.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads bits back from a payload whose final byte is only partly meaningful.
pub struct BitReader<R: Read> {
    bytes: Peekable<io::Bytes<R>>,
    current: u8,
    used: u8,
    limit: u8,
    last_byte_bits: u8,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a reader; only the first `last_byte_bits` bits of the final
    /// byte are yielded.
    pub fn new(inner: R, last_byte_bits: u8) -> Self {
        Self {
            bytes: inner.bytes().peekable(),
            current: 0,
            used: 0,
            limit: 0,
            last_byte_bits,
            bytes_read: 0,
        }
    }

    /// Next meaningful bit, or `None` at end of stream.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        while self.used == self.limit {
            let Some(byte) = self.bytes.next() else {
                return Ok(None);
            };
            self.current = byte?;
            self.bytes_read += 1;
            self.used = 0;
            self.limit = if self.bytes.peek().is_none() {
                self.last_byte_bits
            } else {
                8
            };
        }
        let bit = (self.current >> (7 - self.used)) & 1 == 1;
        self.used += 1;
        Ok(Some(bit))
    }

    /// Bytes pulled from the inner reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Iterator for BitReader<R> {
    type Item = io::Result<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_bit().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bits_of(s: &str) -> Vec<bool> {
        s.bytes().map(|b| b == b'1').collect()
    }

    #[test]
    fn test_msb_first_packing() {
        let mut w = BitWriter::new(Vec::new());
        for bit in bits_of("1010000011") {
            w.push_bit(bit).unwrap();
        }
        assert_eq!(w.pending_bits(), 2);
        assert!(w.flush().unwrap());
        assert_eq!(w.last_byte_bits(), 2);
        assert_eq!(w.bytes_written(), 2);
        assert_eq!(w.into_inner(), vec![0b1010_0000, 0b1100_0000]);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut w = BitWriter::new(Vec::new());
        w.push_code(&Code::from(bits_of("101"))).unwrap();
        assert!(w.flush().unwrap());
        assert!(!w.flush().unwrap());
        assert!(!w.flush().unwrap());
        assert_eq!(w.last_byte_bits(), 3);
        assert_eq!(w.into_inner(), vec![0b1010_0000]);
    }

    #[test]
    fn test_full_byte_records_eight() {
        let mut w = BitWriter::new(Vec::new());
        for bit in bits_of("1111000011110000") {
            w.push_bit(bit).unwrap();
        }
        assert!(!w.flush().unwrap());
        assert_eq!(w.last_byte_bits(), 8);
        assert_eq!(w.into_inner(), vec![0xF0, 0xF0]);
    }

    #[test]
    fn test_nothing_written_records_zero() {
        let mut w = BitWriter::new(Vec::new());
        assert!(!w.flush().unwrap());
        assert_eq!(w.last_byte_bits(), 0);
        assert!(w.into_inner().is_empty());
    }

    #[test]
    fn test_reader_stops_at_meaningful_bits() {
        let data = [0b1010_1010u8, 0b1110_0000];
        let bits: Vec<bool> = BitReader::new(&data[..], 3)
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(bits, bits_of("10101010111"));
    }

    #[test]
    fn test_reader_on_empty_stream() {
        let mut r = BitReader::new(&[][..], 0);
        assert!(r.read_bit().unwrap().is_none());
        assert_eq!(r.bytes_read(), 0);
    }

    proptest! {
        #[test]
        fn prop_writer_reader_agree(bits in prop::collection::vec(any::<bool>(), 0..200)) {
            let mut w = BitWriter::new(Vec::new());
            for &b in &bits {
                w.push_bit(b).unwrap();
            }
            w.flush().unwrap();
            let last = w.last_byte_bits();
            let bytes = w.into_inner();
            prop_assert_eq!(bytes.len(), (bits.len() + 7) / 8);

            let back: Vec<bool> = BitReader::new(&bytes[..], last)
                .collect::<io::Result<_>>()
                .unwrap();
            prop_assert_eq!(back, bits);
        }
    }
}
