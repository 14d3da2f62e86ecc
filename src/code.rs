//! Encoding map: the bit path from the root to every leaf.

use std::fmt;

use crate::error::{Error, Result};
use crate::freq::{FrequencyTable, ALPHABET_SIZE};
use crate::tree::{HuffmanTree, Node};

/// Longest code the one-byte length field of a prelogue entry can describe.
pub const MAX_CODE_LEN: usize = u8::MAX as usize;

/// A single prefix code, most significant (root-side) bit first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for the zero-length code, which no symbol is ever assigned.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The bits, root first. `true` is a right branch.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// True when `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl From<Vec<bool>> for Code {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to code mapping derived from a [`HuffmanTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBook {
    codes: Vec<Option<Code>>,
}

impl CodeBook {
    /// Walk `tree` and bind each leaf to its path (left=0, right=1).
    ///
    /// # Errors
    /// Returns `Error::EncodingOverflow` if a path is longer than [`MAX_CODE_LEN`].
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        Self::from_root(tree.root())
    }

    /// A code book with no symbols, used for empty input.
    pub fn empty() -> Self {
        Self {
            codes: vec![None; ALPHABET_SIZE],
        }
    }

    fn from_root(root: &Node) -> Result<Self> {
        let mut codes = vec![None; ALPHABET_SIZE];
        let mut path = Vec::new();
        Self::build_codes(root, &mut path, &mut codes)?;
        Ok(Self { codes })
    }

    fn build_codes(node: &Node, path: &mut Vec<bool>, codes: &mut [Option<Code>]) -> Result<()> {
        match node {
            Node::Leaf { symbol, .. } => {
                if path.len() > MAX_CODE_LEN {
                    return Err(Error::EncodingOverflow {
                        symbol: *symbol,
                        length: path.len(),
                    });
                }
                codes[*symbol as usize] = Some(Code::from(path.clone()));
            }
            Node::Internal { left, right, .. } => {
                path.push(false);
                Self::build_codes(left, path, codes)?;
                path.pop();

                if let Some(right) = right {
                    path.push(true);
                    Self::build_codes(right, path, codes)?;
                    path.pop();
                }
            }
        }
        Ok(())
    }

    /// Code assigned to `symbol`, if it occurs in the input.
    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// Assigned codes in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.as_ref().map(|c| (s as u8, c)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    /// True when no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the longest code.
    pub fn max_len(&self) -> usize {
        self.codes.iter().flatten().map(Code::len).max().unwrap_or(0)
    }

    /// Total payload bits needed to encode an input with these frequencies.
    pub fn encoded_bits(&self, table: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(s, c)| table.count(s) * c.len() as u64)
            .sum()
    }
}
