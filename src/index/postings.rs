//! Inverted posting lists: sign → entries containing it.
//!
//! Seeds the approximate matcher with the entries that share at least one
//! sign with the query window under test, so bounded search never scans the
//! whole dictionary. Built once alongside the trie and read-only afterwards.

use std::collections::HashMap;

use crate::sign::Sign;

/// Read-only inverted index from a single sign to the entries containing it
/// at any position.
#[derive(Debug, Default)]
pub struct Postings {
    map: HashMap<Sign, Vec<u32>>,
}

impl Postings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the entry at `entry_index` contains `sign`.
    ///
    /// An entry repeating the same sign is recorded once.
    pub fn add(&mut self, sign: Sign, entry_index: u32) {
        let list = self.map.entry(sign).or_default();
        if list.last() != Some(&entry_index) {
            list.push(entry_index);
        }
    }

    /// Sort every posting list; call once after the build loop.
    pub fn finalize(&mut self) {
        for list in self.map.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
    }

    /// Entries containing `sign`, in ascending index order.
    pub fn get(&self, sign: &Sign) -> &[u32] {
        self.map.get(sign).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union of posting lists for several signs, deduplicated and sorted.
    pub fn union(&self, signs: impl IntoIterator<Item = Sign>) -> Vec<u32> {
        let mut out = Vec::new();
        for sign in signs {
            out.extend_from_slice(self.get(&sign));
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of distinct signs with at least one posting.
    pub fn sign_count(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::normalize;

    fn sample() -> Postings {
        let mut p = Postings::new();
        let g1 = normalize("G1").unwrap();
        let d21 = normalize("D21").unwrap();
        let x1 = normalize("X1").unwrap();
        p.add(g1, 0);
        p.add(d21, 0);
        p.add(g1, 1);
        p.add(x1, 1);
        // Entry 2 contains G1 twice.
        p.add(g1, 2);
        p.add(g1, 2);
        p.finalize();
        p
    }

    #[test]
    fn get_returns_sorted_entries() {
        let p = sample();
        assert_eq!(p.get(&normalize("G1").unwrap()), &[0, 1, 2]);
        assert_eq!(p.get(&normalize("D21").unwrap()), &[0]);
    }

    #[test]
    fn repeated_sign_recorded_once() {
        let p = sample();
        assert_eq!(p.get(&normalize("G1").unwrap()).iter().filter(|&&i| i == 2).count(), 1);
    }

    #[test]
    fn unknown_sign_is_empty() {
        let p = sample();
        assert!(p.get(&normalize("Z9").unwrap()).is_empty());
    }

    #[test]
    fn union_deduplicates() {
        let p = sample();
        let union = p.union([normalize("G1").unwrap(), normalize("X1").unwrap()]);
        assert_eq!(union, vec![0, 1, 2]);
    }

    #[test]
    fn sign_count() {
        assert_eq!(sample().sign_count(), 3);
    }
}
