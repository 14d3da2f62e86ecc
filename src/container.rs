//! Container framing: fixed header and prelogue.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "HUFC"
//!      4     1  format version
//!      5     1  meaningful bits in the last payload byte (0 = no payload)
//!      6     4  prelogue length in bytes
//!     10     8  payload length in bytes
//!     18     8  original input length in bytes
//!     26     .  prelogue, then payload
//! ```
//!
//! Integers are big-endian. Each prelogue entry is the symbol byte, the code
//! length in bits, then the code packed MSB-first and padded to a whole byte.

use std::io::{self, Read, Write};

use crate::bits::BitWriter;
use crate::code::{Code, CodeBook, MAX_CODE_LEN};
use crate::error::{Error, Result};

/// Leading bytes of every container.
pub const MAGIC: [u8; 4] = *b"HUFC";

/// Format version written by this crate.
pub const VERSION: u8 = 1;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 26;

/// Largest prelogue a valid container can carry: every byte value with a
/// maximal code.
pub const MAX_PRELOGUE_LEN: u32 = 256 * (2 + (MAX_CODE_LEN as u32 + 7) / 8);

/// Fields known only after the payload has been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Meaningful bits in the final payload byte; 8 for a full byte, 0 only
    /// when the payload is empty.
    pub last_byte_bits: u8,
    /// Bytes of prelogue following the header.
    pub prelogue_len: u32,
    /// Bytes of payload following the prelogue.
    pub payload_len: u64,
    /// Length of the uncompressed input.
    pub original_len: u64,
}

impl Header {
    /// Serialize to the fixed on-disk layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC);
        out[4] = VERSION;
        out[5] = self.last_byte_bits;
        out[6..10].copy_from_slice(&self.prelogue_len.to_be_bytes());
        out[10..18].copy_from_slice(&self.payload_len.to_be_bytes());
        out[18..26].copy_from_slice(&self.original_len.to_be_bytes());
        out
    }

    /// Parse and validate a header.
    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        if bytes[0..4] != MAGIC {
            return Err(Error::corrupt("bad magic, not a huff container"));
        }
        if bytes[4] != VERSION {
            return Err(Error::corrupt(format!(
                "unsupported format version {}",
                bytes[4]
            )));
        }
        let mut u32_buf = [0u8; 4];
        let mut u64_buf = [0u8; 8];

        u32_buf.copy_from_slice(&bytes[6..10]);
        let prelogue_len = u32::from_be_bytes(u32_buf);
        u64_buf.copy_from_slice(&bytes[10..18]);
        let payload_len = u64::from_be_bytes(u64_buf);
        u64_buf.copy_from_slice(&bytes[18..26]);
        let original_len = u64::from_be_bytes(u64_buf);

        let header = Self {
            last_byte_bits: bytes[5],
            prelogue_len,
            payload_len,
            original_len,
        };
        header.validate()?;
        Ok(header)
    }

    /// Check the fields against each other.
    pub fn validate(&self) -> Result<()> {
        if self.last_byte_bits > 8 {
            return Err(Error::corrupt(format!(
                "last byte claims {} meaningful bits",
                self.last_byte_bits
            )));
        }
        if self.prelogue_len > MAX_PRELOGUE_LEN {
            return Err(Error::corrupt(format!(
                "prelogue of {} bytes exceeds the {} byte maximum",
                self.prelogue_len, MAX_PRELOGUE_LEN
            )));
        }
        if (self.payload_len == 0) != (self.last_byte_bits == 0) {
            return Err(Error::corrupt(format!(
                "payload of {} bytes with {} bits in the last byte",
                self.payload_len, self.last_byte_bits
            )));
        }
        if (self.payload_len == 0) != (self.original_len == 0) {
            return Err(Error::corrupt(format!(
                "payload of {} bytes for {} input bytes",
                self.payload_len, self.original_len
            )));
        }
        Ok(())
    }

    /// Write the serialized header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read and validate a header.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; HEADER_LEN];
        reader
            .read_exact(&mut bytes)
            .map_err(|e| Error::from_read(e, "header"))?;
        Self::from_bytes(&bytes)
    }
}

/// Write one prelogue entry per coded symbol in ascending symbol order.
///
/// Returns the number of bytes written.
///
/// # Errors
/// Returns `Error::EncodingOverflow` if a code does not fit the length byte,
/// and `Error::Io` if the sink fails.
pub fn write_prelogue<W: Write>(writer: W, codes: &CodeBook) -> Result<u32> {
    let mut bits = BitWriter::new(writer);
    for (symbol, code) in codes.iter() {
        let len = u8::try_from(code.len()).map_err(|_| Error::EncodingOverflow {
            symbol,
            length: code.len(),
        })?;
        bits.write_aligned(&[symbol, len])?;
        bits.push_code(code)?;
        bits.flush()?;
        log::trace!("prelogue entry {:#04x}: {} ({} bits)", symbol, code, len);
    }
    u32::try_from(bits.bytes_written()).map_err(|_| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            "prelogue does not fit its length field",
        ))
    })
}

/// Split a prelogue back into `(symbol, code)` entries.
///
/// # Errors
/// Returns `Error::StreamCorrupt` for truncated entries, zero-length codes,
/// and symbols listed more than once.
pub fn parse_prelogue(bytes: &[u8]) -> Result<Vec<(u8, Code)>> {
    let mut entries = Vec::new();
    let mut seen = [false; 256];
    let mut rest = bytes;

    while let [symbol, len, tail @ ..] = rest {
        let (symbol, len) = (*symbol, *len as usize);
        if len == 0 {
            return Err(Error::corrupt(format!(
                "symbol {symbol:#04x} has an empty code"
            )));
        }
        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(Error::corrupt(format!(
                "symbol {symbol:#04x} listed twice in prelogue"
            )));
        }
        let nbytes = (len + 7) / 8;
        if tail.len() < nbytes {
            return Err(Error::corrupt(format!(
                "prelogue entry for {symbol:#04x} is truncated"
            )));
        }
        let (packed, tail) = tail.split_at(nbytes);
        let code: Vec<bool> = (0..len)
            .map(|i| (packed[i / 8] >> (7 - i % 8)) & 1 == 1)
            .collect();
        entries.push((symbol, Code::from(code)));
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(Error::corrupt("stray byte at the end of the prelogue"));
    }
    Ok(entries)
}
