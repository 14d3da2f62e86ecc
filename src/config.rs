//! Encoder configuration.
//!
//! Values can be set in code or read from `HUFF_*` environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default capacity of the buffered readers and writers wrapped around
/// caller-supplied streams.
pub const DEFAULT_IO_BUFFER: usize = 64 * 1024;

/// How the header is filled in once the payload length is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backpatch {
    /// Write straight to the sink, then seek back and overwrite the header.
    #[default]
    Seek,
    /// Assemble the whole container in memory and write it in one piece.
    Buffer,
}

impl FromStr for Backpatch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seek" => Ok(Backpatch::Seek),
            "buffer" | "memory" => Ok(Backpatch::Buffer),
            other => Err(Error::InvalidConfig(format!(
                "unknown backpatch mode {other:?}, expected \"seek\" or \"buffer\""
            ))),
        }
    }
}

impl fmt::Display for Backpatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backpatch::Seek => "seek",
            Backpatch::Buffer => "buffer",
        })
    }
}

/// Settings for [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Header backpatch strategy.
    pub backpatch: Backpatch,
    /// Buffer capacity in bytes for input and output streams.
    pub io_buffer_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            backpatch: Backpatch::Seek,
            io_buffer_size: DEFAULT_IO_BUFFER,
        }
    }
}

impl EncoderConfig {
    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.io_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "io_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Read `HUFF_BACKPATCH` and `HUFF_IO_BUFFER`, defaulting unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_prefix("HUFF_")
    }

    /// Like [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        if let Some(mode) = env_var(&format!("{prefix}BACKPATCH")) {
            config.backpatch = mode.parse()?;
        }
        if let Some(size) = env_var(&format!("{prefix}IO_BUFFER")) {
            config.io_buffer_size = size.trim().parse().map_err(|e| {
                Error::InvalidConfig(format!("{prefix}IO_BUFFER={size:?}: {e}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Same settings with a different backpatch strategy.
    pub fn with_backpatch(mut self, backpatch: Backpatch) -> Self {
        self.backpatch = backpatch;
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EncoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backpatch, Backpatch::Seek);
    }

    #[test]
    fn test_backpatch_parse() {
        assert_eq!("seek".parse::<Backpatch>().unwrap(), Backpatch::Seek);
        assert_eq!(" Buffer ".parse::<Backpatch>().unwrap(), Backpatch::Buffer);
        assert!(matches!(
            "rewind".parse::<Backpatch>(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config = EncoderConfig {
            io_buffer_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_env() {
        env::set_var("HUFF_TEST_ENV_BACKPATCH", "buffer");
        env::set_var("HUFF_TEST_ENV_IO_BUFFER", "4096");
        let config = EncoderConfig::from_env_with_prefix("HUFF_TEST_ENV_").unwrap();
        assert_eq!(config.backpatch, Backpatch::Buffer);
        assert_eq!(config.io_buffer_size, 4096);
    }

    #[test]
    fn test_from_env_bad_number() {
        env::set_var("HUFF_TEST_BAD_IO_BUFFER", "lots");
        assert!(matches!(
            EncoderConfig::from_env_with_prefix("HUFF_TEST_BAD_"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_env_unset_uses_defaults() {
        let config = EncoderConfig::from_env_with_prefix("HUFF_TEST_UNSET_").unwrap();
        assert_eq!(config, EncoderConfig::default());
    }
}
