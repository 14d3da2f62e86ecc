//! Byte frequency counting.

use std::io::Read;

use crate::error::Result;

/// Number of distinct byte values.
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count for every byte value of an input.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    /// Count the bytes of an in-memory slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; ALPHABET_SIZE];
        for &b in data {
            counts[b as usize] += 1;
        }
        Self { counts }
    }

    /// Count every byte of a reader until end of stream.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut counts = [0u64; ALPHABET_SIZE];
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &b in &buf[..n] {
                counts[b as usize] += 1;
            }
        }
        Ok(Self { counts })
    }

    /// Build a table from raw counts, indexed by byte value.
    pub fn from_counts(counts: [u64; ALPHABET_SIZE]) -> Self {
        Self { counts }
    }

    /// Occurrences of `symbol`.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Symbols with a nonzero count, in ascending byte order, with their counts.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }

    /// Number of distinct symbols present.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// True when no byte was counted.
    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
}

impl std::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.present()).finish()
    }
}
