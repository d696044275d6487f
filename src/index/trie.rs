//! Sign-keyed trie over canonical dictionary sequences.
//!
//! Each edge is one [`Sign`]; a node's terminal list holds the indices of
//! every entry whose headword ends there, so duplicate sign sequences with
//! different meanings coexist on one node. Exact and prefix lookup are
//! O(sequence length); the incremental walk powers sliding-window
//! segmentation without re-walking shared prefixes.

use std::collections::HashMap;

use crate::sign::Sign;

#[derive(Debug, Default)]
struct Node {
    children: HashMap<Sign, Node>,
    /// Indices (into the index's entry table) terminating at this node.
    terminals: Vec<u32>,
}

/// Trie over sign sequences, mapping them to entry indices.
#[derive(Debug, Default)]
pub struct SignTrie {
    root: Node,
    len: usize,
}

impl SignTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one canonical sequence terminating at `entry_index`.
    pub fn insert(&mut self, signs: &[Sign], entry_index: u32) {
        let mut node = &mut self.root;
        for sign in signs {
            node = node.children.entry(*sign).or_default();
        }
        node.terminals.push(entry_index);
        self.len += 1;
    }

    /// Number of inserted sequences (counting duplicates).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn descend(&self, signs: &[Sign]) -> Option<&Node> {
        let mut node = &self.root;
        for sign in signs {
            node = node.children.get(sign)?;
        }
        Some(node)
    }

    /// Entry indices whose sequence equals `signs` exactly.
    pub fn lookup_exact(&self, signs: &[Sign]) -> Vec<u32> {
        let mut out = self
            .descend(signs)
            .map(|node| node.terminals.clone())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    /// Entry indices whose sequence starts with `signs` (including exact
    /// matches), in deterministic order.
    pub fn lookup_prefix(&self, signs: &[Sign]) -> Vec<u32> {
        let mut out = Vec::new();
        if let Some(node) = self.descend(signs) {
            collect_subtree(node, &mut out);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Walk from the root along `signs`, reporting every terminal passed.
    ///
    /// Returns `(consumed, entry_indices)` pairs: a pair `(k, ids)` means the
    /// first `k` signs of the argument form a complete dictionary headword.
    /// The walk stops at the first sign with no outgoing edge.
    pub fn walk_terminals(&self, signs: &[Sign]) -> Vec<(usize, &[u32])> {
        let mut out = Vec::new();
        let mut node = &self.root;
        for (i, sign) in signs.iter().enumerate() {
            match node.children.get(sign) {
                Some(next) => {
                    node = next;
                    if !node.terminals.is_empty() {
                        out.push((i + 1, node.terminals.as_slice()));
                    }
                }
                None => break,
            }
        }
        out
    }
}

fn collect_subtree(node: &Node, out: &mut Vec<u32>) {
    out.extend_from_slice(&node.terminals);
    for child in node.children.values() {
        collect_subtree(child, out);
    }
}
