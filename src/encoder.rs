//! Container encoding.
//!
//! The input is read twice: once to count byte frequencies and once to emit
//! the payload. The header is reserved up front and filled in last, either by
//! seeking back in the sink or by building the container in memory first.

use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use crate::bits::BitWriter;
use crate::code::CodeBook;
use crate::config::{Backpatch, EncoderConfig};
use crate::container::{write_prelogue, Header, HEADER_LEN};
use crate::error::{Error, Result};
use crate::freq::FrequencyTable;
use crate::tree::HuffmanTree;

/// Totals reported by a successful encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Header written at the front of the container.
    pub header: Header,
    /// Number of distinct byte values in the input.
    pub distinct_symbols: usize,
    /// Total container size in bytes.
    pub output_len: u64,
}

/// Writes self-describing Huffman containers.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Create an encoder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with `config`.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if `config` fails validation.
    pub fn with_config(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `input`, from its current position to its end, into `output`.
    ///
    /// With [`Backpatch::Seek`] the container is streamed into `output` and
    /// the header is patched in place; with [`Backpatch::Buffer`] this is
    /// [`encode_buffered`](Self::encode_buffered). On error, anything already
    /// written to `output` is not a valid container.
    pub fn encode<R, W>(&self, input: &mut R, output: &mut W) -> Result<EncodeSummary>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        match self.config.backpatch {
            Backpatch::Seek => self.write_container(input, output),
            Backpatch::Buffer => self.encode_buffered(input, output),
        }
    }

    /// Assemble the container in memory, then write it to `output` in one
    /// call. The sink never has to seek.
    pub fn encode_buffered<R, W>(&self, input: &mut R, mut output: W) -> Result<EncodeSummary>
    where
        R: Read + Seek,
        W: Write,
    {
        let mut buf = Cursor::new(Vec::new());
        let summary = self.write_container(input, &mut buf)?;
        output.write_all(buf.get_ref())?;
        output.flush()?;
        Ok(summary)
    }

    /// Encode from a reader that cannot rewind into a writer that cannot seek.
    ///
    /// Both the input and the finished container are held in memory.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` unless the configuration selects
    /// [`Backpatch::Buffer`].
    pub fn encode_unseekable<R: Read, W: Write>(
        &self,
        mut input: R,
        output: W,
    ) -> Result<EncodeSummary> {
        if self.config.backpatch != Backpatch::Buffer {
            return Err(Error::InvalidConfig(format!(
                "a non-seekable sink needs backpatch mode \"buffer\", configured \"{}\"",
                self.config.backpatch
            )));
        }
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;
        self.encode_buffered(&mut Cursor::new(data), output)
    }

    fn write_container<R, W>(&self, input: &mut R, output: &mut W) -> Result<EncodeSummary>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let cap = self.config.io_buffer_size;
        let input_start = input.stream_position()?;
        let table = FrequencyTable::from_reader(&mut BufReader::with_capacity(cap, &mut *input))?;

        // Codes are derived, and length-checked, before anything is written.
        let codes = match HuffmanTree::build(&table) {
            Some(tree) => CodeBook::from_tree(&tree)?,
            None => CodeBook::empty(),
        };

        let header_pos = output.stream_position()?;
        output.write_all(&[0u8; HEADER_LEN])?;

        let mut sink = BufWriter::with_capacity(cap, &mut *output);
        let prelogue_len = write_prelogue(&mut sink, &codes)?;

        input.seek(SeekFrom::Start(input_start))?;
        let reader = BufReader::with_capacity(cap, &mut *input);
        let mut bits = BitWriter::new(&mut sink);
        let mut original_len = 0u64;
        for byte in reader.bytes() {
            let byte = byte?;
            let code = codes.get(byte).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("byte {byte:#04x} appeared after the frequency scan"),
                )
            })?;
            bits.push_code(code)?;
            original_len += 1;
        }
        bits.flush()?;
        if original_len != table.total() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "input changed between passes: counted {} bytes, then read {}",
                    table.total(),
                    original_len
                ),
            )));
        }

        let header = Header {
            last_byte_bits: bits.last_byte_bits(),
            prelogue_len,
            payload_len: bits.bytes_written(),
            original_len,
        };
        sink.flush()?;
        drop(sink);

        let end_pos = output.stream_position()?;
        output.seek(SeekFrom::Start(header_pos))?;
        header.write_to(output)?;
        output.seek(SeekFrom::Start(end_pos))?;
        output.flush()?;
        log::debug!(
            "patched header at {}: {} prelogue bytes, {} payload bytes, {} bits in last byte",
            header_pos,
            header.prelogue_len,
            header.payload_len,
            header.last_byte_bits
        );

        Ok(EncodeSummary {
            header,
            distinct_symbols: codes.len(),
            output_len: end_pos - header_pos,
        })
    }
}
