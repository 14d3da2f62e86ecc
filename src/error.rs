//! Error types for Huffman encoding and decoding.

use thiserror::Error;

/// Error variants for codec operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A symbol's code does not fit in the one-byte length field of the prelogue.
    #[error("code for symbol {symbol:#04x} is {length} bits, longer than the length field allows")]
    EncodingOverflow {
        /// The symbol whose code overflowed.
        symbol: u8,
        /// Length of the offending code in bits.
        length: usize,
    },

    /// The container is malformed or truncated.
    #[error("corrupt stream: {0}")]
    StreamCorrupt(String),

    /// Configuration values are out of range or unparseable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred during encoding or decoding.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::StreamCorrupt(msg.into())
    }

    /// Maps an early end of file to [`Error::StreamCorrupt`], since it means
    /// the container stopped before a field it declared.
    pub(crate) fn from_read(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::StreamCorrupt(format!("container ended inside the {what}"))
        } else {
            Error::Io(err)
        }
    }
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
