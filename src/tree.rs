//! Huffman tree construction.
//!
//! Leaves are merged pairwise from a min-priority queue until one root
//! remains. Queue order is `(frequency, sequence)`: leaves are numbered in
//! ascending byte order and every merged node takes the next number, so two
//! runs over the same frequencies always produce the same tree.
//!
//! # Historical Context
//!
//! David Huffman (1952) developed this algorithm as a term paper at MIT.
//! It was the first practical algorithm for constructing optimal prefix codes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::freq::FrequencyTable;

/// Huffman tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A symbol present in the input.
    Leaf {
        /// Byte value.
        symbol: u8,
        /// Occurrences of `symbol`.
        freq: u64,
    },
    /// Merge of two subtrees.
    Internal {
        /// Sum of the children's frequencies.
        freq: u64,
        /// Subtree reached with a `0` bit.
        left: Box<Node>,
        /// Subtree reached with a `1` bit. Absent only under the synthetic
        /// root that wraps a lone symbol.
        right: Option<Box<Node>>,
    },
}

impl Node {
    /// Frequency carried by this node.
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    /// True for [`Node::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    fn merge(left: Node, right: Node) -> Node {
        Node::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    fn wrap(only: Node) -> Node {
        Node::Internal {
            freq: only.freq(),
            left: Box::new(only),
            right: None,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => {
                let r = right.as_ref().map_or(0, |r| r.depth());
                1 + left.depth().max(r)
            }
        }
    }
}

/// Queue entry; `BinaryHeap` is a max-heap so the ordering is reversed.
#[derive(Debug)]
struct Queued {
    freq: u64,
    seq: u32,
    node: Node,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A prefix tree over the symbols of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree for `table`.
    ///
    /// Returns `None` when every count is zero. A single distinct symbol is
    /// wrapped in an internal root so that it still gets the one-bit code `0`.
    pub fn build(table: &FrequencyTable) -> Option<Self> {
        let mut pq = BinaryHeap::new();
        let mut seq = 0u32;
        for (symbol, freq) in table.present() {
            pq.push(Queued {
                freq,
                seq,
                node: Node::Leaf { symbol, freq },
            });
            seq += 1;
        }

        if pq.len() == 1 {
            let only = pq.pop()?.node;
            return Some(Self {
                root: Node::wrap(only),
            });
        }

        let root = loop {
            let left = pq.pop()?;
            let Some(right) = pq.pop() else {
                break left.node;
            };
            pq.push(Queued {
                freq: left.freq + right.freq,
                seq,
                node: Node::merge(left.node, right.node),
            });
            seq += 1;
        };

        let tree = Self { root };
        log::debug!(
            "built huffman tree: {} symbols, {} total, depth {}",
            table.distinct(),
            tree.frequency(),
            tree.depth()
        );
        Some(tree)
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Frequency of the root, equal to the input length.
    pub fn frequency(&self) -> u64 {
        self.root.freq()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frequencies_consistent(node: &Node) -> bool {
        match node {
            Node::Leaf { freq, .. } => *freq > 0,
            Node::Internal { freq, left, right } => {
                let r = right.as_ref().map_or(0, |r| r.freq());
                *freq == left.freq() + r
                    && frequencies_consistent(left)
                    && right.as_deref().map_or(true, frequencies_consistent)
            }
        }
    }

    fn leaves(node: &Node, out: &mut Vec<(u8, u64)>) {
        match node {
            Node::Leaf { symbol, freq } => out.push((*symbol, *freq)),
            Node::Internal { left, right, .. } => {
                leaves(left, out);
                if let Some(r) = right {
                    leaves(r, out);
                }
            }
        }
    }

    #[test]
    fn test_empty_table_has_no_tree() {
        assert!(HuffmanTree::build(&FrequencyTable::from_bytes(b"")).is_none());
    }

    #[test]
    fn test_single_symbol_is_wrapped() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"aaaa")).unwrap();
        match tree.root() {
            Node::Internal { freq, left, right } => {
                assert_eq!(*freq, 4);
                assert_eq!(**left, Node::Leaf { symbol: b'a', freq: 4 });
                assert!(right.is_none());
            }
            Node::Leaf { .. } => panic!("lone symbol must not be the root"),
        }
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_ties_break_by_sequence() {
        // C(1) and B(2) merge first into a node tied with A(3); A was queued
        // earlier so it pops first and lands on the left.
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"AAABBC")).unwrap();
        let Node::Internal { left, right, .. } = tree.root() else {
            panic!("root must be internal");
        };
        assert_eq!(**left, Node::Leaf { symbol: b'A', freq: 3 });
        let right = right.as_deref().unwrap();
        assert_eq!(right.freq(), 3);
        assert!(!right.is_leaf());
    }

    #[test]
    fn test_build_is_deterministic() {
        let table = FrequencyTable::from_bytes(b"the quick brown fox jumps over the lazy dog");
        assert_eq!(HuffmanTree::build(&table), HuffmanTree::build(&table));
    }

    proptest! {
        #[test]
        fn prop_frequencies_sum_to_root(data in prop::collection::vec(any::<u8>(), 1..512)) {
            let table = FrequencyTable::from_bytes(&data);
            let tree = HuffmanTree::build(&table).unwrap();
            prop_assert_eq!(tree.frequency(), data.len() as u64);
            prop_assert!(frequencies_consistent(tree.root()));

            let mut found = Vec::new();
            leaves(tree.root(), &mut found);
            found.sort_unstable();
            let expected: Vec<(u8, u64)> = table.present().collect();
            prop_assert_eq!(found, expected);
        }
    }
}
