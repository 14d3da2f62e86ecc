//! Container decoding: prelogue to tree, then a bit-by-bit tree walk.

use std::io::{BufReader, BufWriter, Read, Write};

use crate::bits::BitReader;
use crate::code::Code;
use crate::config::DEFAULT_IO_BUFFER;
use crate::container::{parse_prelogue, Header};
use crate::error::{Error, Result};

/// Arena slot; index 0 is the root.
#[derive(Debug, Clone, Default)]
struct Slot {
    children: [Option<u32>; 2],
    symbol: Option<u8>,
}

impl Slot {
    fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }
}

/// Prefix tree rebuilt from prelogue entries.
///
/// Interior nodes are created lazily as paths are inserted, so a branch that
/// no code uses stays absent and walking into it is reported as corruption.
#[derive(Debug, Clone)]
pub struct DecodeTree {
    nodes: Vec<Slot>,
}

impl Default for DecodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Slot::default()],
        }
    }

    /// Rebuild from `(symbol, code)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a (u8, Code)>,
    {
        let mut tree = Self::new();
        for (symbol, code) in entries {
            tree.insert(*symbol, code)?;
        }
        Ok(tree)
    }

    /// Bind `symbol` at the end of `code`'s path.
    ///
    /// # Errors
    /// Returns `Error::StreamCorrupt` if the path runs through a bound leaf,
    /// ends on a node that is already bound or has children, or is empty.
    pub fn insert(&mut self, symbol: u8, code: &Code) -> Result<()> {
        if code.is_empty() {
            return Err(Error::corrupt(format!(
                "symbol {symbol:#04x} has an empty code"
            )));
        }
        let mut at = 0usize;
        for &bit in code.bits() {
            if let Some(bound) = self.nodes[at].symbol {
                return Err(Error::corrupt(format!(
                    "code {code} for {symbol:#04x} passes through the leaf of {bound:#04x}"
                )));
            }
            at = match self.nodes[at].children[bit as usize] {
                Some(next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Slot::default());
                    self.nodes[at].children[bit as usize] = Some(next as u32);
                    next
                }
            };
        }

        let slot = &mut self.nodes[at];
        if let Some(bound) = slot.symbol {
            return Err(Error::corrupt(format!(
                "code {code} bound to both {bound:#04x} and {symbol:#04x}"
            )));
        }
        if slot.has_children() {
            return Err(Error::corrupt(format!(
                "code {code} for {symbol:#04x} is a prefix of another code"
            )));
        }
        slot.symbol = Some(symbol);
        Ok(())
    }

    /// True when no symbol has been inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Start a walk at the root.
    pub fn walker(&self) -> Walker<'_> {
        Walker { tree: self, at: 0 }
    }
}

/// Cursor into a [`DecodeTree`].
pub struct Walker<'a> {
    tree: &'a DecodeTree,
    at: u32,
}

impl Walker<'_> {
    /// Follow one bit. Returns the symbol when a leaf is reached, after
    /// which the walk restarts at the root.
    ///
    /// # Errors
    /// Returns `Error::StreamCorrupt` if the branch does not exist.
    pub fn step(&mut self, bit: bool) -> Result<Option<u8>> {
        let next = self.tree.nodes[self.at as usize].children[bit as usize]
            .ok_or_else(|| Error::corrupt("payload follows a branch no code uses"))?;
        match self.tree.nodes[next as usize].symbol {
            Some(symbol) => {
                self.at = 0;
                Ok(Some(symbol))
            }
            None => {
                self.at = next;
                Ok(None)
            }
        }
    }

    /// True between symbols.
    pub fn at_root(&self) -> bool {
        self.at == 0
    }
}

/// Totals reported by a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Header read from the container.
    pub header: Header,
    /// Bytes written to the output.
    pub output_len: u64,
}

/// Reads containers produced by [`Encoder`](crate::Encoder).
#[derive(Debug, Clone)]
pub struct Decoder {
    io_buffer_size: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder with the default buffer size.
    pub fn new() -> Self {
        Self {
            io_buffer_size: DEFAULT_IO_BUFFER,
        }
    }

    /// Use `size` bytes for the input and output buffers.
    pub fn with_buffer_size(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig(
                "io buffer size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            io_buffer_size: size,
        })
    }

    /// Decode one container from `input` into `output`.
    ///
    /// Output written before an error is returned must be discarded.
    pub fn decode<R: Read, W: Write>(&self, input: R, output: W) -> Result<DecodeSummary> {
        let mut input = BufReader::with_capacity(self.io_buffer_size, input);
        let header = Header::read_from(&mut input)?;

        let mut prelogue = vec![0u8; header.prelogue_len as usize];
        input
            .read_exact(&mut prelogue)
            .map_err(|e| Error::from_read(e, "prelogue"))?;
        let entries = parse_prelogue(&prelogue)?;
        let tree = DecodeTree::from_entries(&entries)?;
        log::debug!(
            "container: {} symbols, {} payload bytes, {} bits in last byte, {} original bytes",
            entries.len(),
            header.payload_len,
            header.last_byte_bits,
            header.original_len
        );

        if tree.is_empty() && header.original_len != 0 {
            return Err(Error::corrupt("payload present but prelogue is empty"));
        }

        let mut output = BufWriter::with_capacity(self.io_buffer_size, output);
        let mut written = 0u64;
        let payload_bytes = {
            let mut walker = tree.walker();
            let payload = input.by_ref().take(header.payload_len);
            let mut bits = BitReader::new(payload, header.last_byte_bits);
            while let Some(bit) = bits.read_bit()? {
                if let Some(symbol) = walker.step(bit)? {
                    if written == header.original_len {
                        return Err(Error::corrupt("payload decodes past the original length"));
                    }
                    output.write_all(&[symbol])?;
                    written += 1;
                }
            }
            if !walker.at_root() {
                return Err(Error::corrupt("payload ends in the middle of a code"));
            }
            bits.bytes_read()
        };

        if payload_bytes != header.payload_len {
            return Err(Error::corrupt(format!(
                "payload truncated: expected {} bytes, found {}",
                header.payload_len, payload_bytes
            )));
        }
        let mut probe = [0u8; 1];
        if input.read(&mut probe)? != 0 {
            return Err(Error::corrupt("trailing bytes after payload"));
        }
        if written != header.original_len {
            return Err(Error::corrupt(format!(
                "decoded {} bytes, header promises {}",
                written, header.original_len
            )));
        }
        output.flush()?;

        Ok(DecodeSummary {
            header,
            output_len: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        Code::from(s.bytes().map(|b| b == b'1').collect::<Vec<_>>())
    }

    #[test]
    fn test_walk_emits_and_resets() {
        let entries = vec![(b'a', code("0")), (b'b', code("10")), (b'c', code("11"))];
        let tree = DecodeTree::from_entries(&entries).unwrap();
        let mut walker = tree.walker();
        let mut out = Vec::new();
        for bit in [false, true, true, true, false, false] {
            if let Some(s) = walker.step(bit).unwrap() {
                out.push(s);
            }
        }
        assert_eq!(out, b"acba");
        assert!(walker.at_root());
    }

    #[test]
    fn test_missing_branch_is_corrupt() {
        let tree = DecodeTree::from_entries(&[(b'z', code("0"))]).unwrap();
        let mut walker = tree.walker();
        assert_eq!(walker.step(false).unwrap(), Some(b'z'));
        assert!(matches!(walker.step(true), Err(Error::StreamCorrupt(_))));
    }

    #[test]
    fn test_prefix_collisions_rejected() {
        let mut tree = DecodeTree::new();
        tree.insert(b'a', &code("0")).unwrap();
        assert!(matches!(
            tree.insert(b'b', &code("01")),
            Err(Error::StreamCorrupt(_))
        ));

        let mut tree = DecodeTree::new();
        tree.insert(b'a', &code("01")).unwrap();
        assert!(matches!(
            tree.insert(b'b', &code("0")),
            Err(Error::StreamCorrupt(_))
        ));
        assert!(matches!(
            tree.insert(b'c', &code("01")),
            Err(Error::StreamCorrupt(_))
        ));
    }

    #[test]
    fn test_empty_code_rejected() {
        let mut tree = DecodeTree::new();
        assert!(tree.insert(b'a', &Code::default()).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        assert!(matches!(
            Decoder::with_buffer_size(0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
