//! # Static Huffman Coding
//!
//! *Lossless byte-stream compression with a self-describing container.*
//!
//! ## Intuition First
//!
//! Some bytes show up far more often than others. Huffman coding gives the
//! common ones short bit strings and the rare ones long bit strings, chosen
//! so that no string is the beginning of another. A reader can then split a
//! continuous run of bits back into symbols without any separators.
//!
//! ## The Problem
//!
//! A compressed stream is useless without the code that produced it. This
//! crate writes the code table (the *prelogue*) in front of the packed bits,
//! so a container can be decoded with nothing but the container itself.
//!
//! ## Pipeline
//!
//! ```text
//! encode: input ─► FrequencyTable ─► HuffmanTree ─► CodeBook ─┐
//!         input (second pass) ──────────────────► BitWriter ──┴─► header + prelogue + payload
//!
//! decode: header ─► prelogue ─► DecodeTree ─► BitReader + Walker ─► output
//! ```
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(n + k \log k)$ to encode $n$ bytes with $k \le 256$ distinct
//!   symbols; $O(\text{payload bits})$ to decode.
//! - **Space**: $O(k)$ for the tree and codes. With `Backpatch::Seek` the
//!   container streams straight into a seekable sink; `Backpatch::Buffer`
//!   holds the whole container in memory, and [`encode`] also holds the input.
//!
//! ## Failure Modes
//!
//! 1. **Encoding overflow**: a code longer than the 255-bit length field.
//!    Cannot happen for 256 symbols but is still checked.
//! 2. **Corrupt stream**: truncation, prefix collisions in the prelogue, or a
//!    payload walking into a branch no code uses.
//!
//! ## Example
//!
//! ```
//! let packed = huff::encode(&b"abracadabra"[..])?;
//! assert_eq!(huff::decode(&packed[..])?, b"abracadabra");
//! # Ok::<(), huff::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod code;
pub mod config;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod freq;
pub mod tree;

use std::io::Read;

pub use bits::{BitReader, BitWriter};
pub use code::{Code, CodeBook, MAX_CODE_LEN};
pub use config::{Backpatch, EncoderConfig};
pub use container::Header;
pub use decoder::{DecodeSummary, DecodeTree, Decoder};
pub use encoder::{EncodeSummary, Encoder};
pub use error::{Error, Result};
pub use freq::FrequencyTable;
pub use tree::HuffmanTree;

/// Compress everything `input` yields into an in-memory container.
///
/// Uses [`Backpatch::Buffer`], since neither side can seek.
pub fn encode<R: Read>(input: R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let config = EncoderConfig::default().with_backpatch(Backpatch::Buffer);
    Encoder::with_config(config)?.encode_unseekable(input, &mut out)?;
    Ok(out)
}

/// Decompress one container read from `input`.
pub fn decode<R: Read>(input: R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    Decoder::new().decode(input, &mut out)?;
    Ok(out)
}
