//! Dictionary index: entries, trie, and posting lists.
//!
//! The index is built once from the full entry set and treated as read-only
//! for the rest of its lifetime, which makes it safely shareable across
//! request threads without locking. Rebuilding (hot reload) replaces the
//! whole index wholesale; nothing is ever edited in place.

pub mod postings;
pub mod trie;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroU64;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, QueryError};
use crate::sign::{Sign, SignSequence, Span};

pub use postings::Postings;
pub use trie::SignTrie;

/// Language key under which transliterations are stored.
pub const TRANSLITERATION: &str = "transliteration";

/// Unique, niche-optimized identifier for a dictionary entry.
///
/// Uses `NonZeroU64` so that `Option<EntryId>` is the same size as `EntryId`.
/// TLA lemma identifiers are positive integers, so zero is free to use as the
/// niche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntryId(NonZeroU64);

impl EntryId {
    /// Create an `EntryId` from a raw `u64`. Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(EntryId)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One lexicon item: a canonical sign sequence paired with its readings.
///
/// Immutable once the index is built; owned by the index and handed out as
/// `Arc<DictionaryEntry>` clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Unique identifier (TLA lemma id for the bundled dictionary).
    pub id: EntryId,
    /// The headword written in signs.
    pub signs: SignSequence,
    /// Transliteration of the headword.
    pub transliteration: String,
    /// Translations keyed by language code (`"en"`, `"de"`, ...).
    pub translations: BTreeMap<String, String>,
    /// Relative frequency/commonality weight used by the ranker.
    pub weight: f32,
}

impl DictionaryEntry {
    pub fn new(id: EntryId, signs: SignSequence, transliteration: impl Into<String>) -> Self {
        Self {
            id,
            signs,
            transliteration: transliteration.into(),
            translations: BTreeMap::new(),
            weight: 0.0,
        }
    }

    pub fn with_translation(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(lang.into(), text.into());
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// What to do when two entries share an identifier.
///
/// Duplicate sign *sequences* are always legal — one headword can carry many
/// meanings. This policy only governs identifier collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Reject the build with [`IndexError::DuplicateEntry`].
    #[default]
    Reject,
    /// Last write wins; the earlier entry is dropped.
    ReplaceExisting,
}

/// Build-time configuration for the index.
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    pub duplicate_policy: DuplicatePolicy,
}

/// Search mode for headword lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    StartsWith,
    Contains,
}

/// In-memory dictionary index: trie for exact/prefix lookup plus inverted
/// posting lists for seeding approximate search.
#[derive(Debug)]
pub struct DictionaryIndex {
    entries: Vec<Arc<DictionaryEntry>>,
    by_id: HashMap<EntryId, u32>,
    trie: SignTrie,
    postings: Postings,
    max_entry_len: usize,
    languages: BTreeSet<String>,
}

impl DictionaryIndex {
    /// Build the index from already-parsed entries.
    ///
    /// Single-threaded, run once at startup or on explicit reload. Fails with
    /// [`IndexError::EmptyDictionary`] on no entries and, under
    /// [`DuplicatePolicy::Reject`], with [`IndexError::DuplicateEntry`] on
    /// identifier collisions.
    pub fn build(entries: Vec<DictionaryEntry>, config: &IndexConfig) -> Result<Self, IndexError> {
        if entries.is_empty() {
            return Err(IndexError::EmptyDictionary);
        }

        let mut deduped: Vec<DictionaryEntry> = Vec::with_capacity(entries.len());
        let mut by_id: HashMap<EntryId, u32> = HashMap::with_capacity(entries.len());
        for entry in entries {
            match by_id.get(&entry.id) {
                Some(&existing) => match config.duplicate_policy {
                    DuplicatePolicy::Reject => {
                        return Err(IndexError::DuplicateEntry {
                            entry_id: entry.id.get(),
                        });
                    }
                    DuplicatePolicy::ReplaceExisting => {
                        deduped[existing as usize] = entry;
                    }
                },
                None => {
                    by_id.insert(entry.id, deduped.len() as u32);
                    deduped.push(entry);
                }
            }
        }

        // Deterministic entry order regardless of input order.
        deduped.sort_by_key(|e| e.id);
        by_id.clear();

        let mut trie = SignTrie::new();
        let mut postings = Postings::new();
        let mut max_entry_len = 0;
        let mut languages = BTreeSet::new();

        for (i, entry) in deduped.iter().enumerate() {
            let idx = i as u32;
            by_id.insert(entry.id, idx);
            trie.insert(entry.signs.signs(), idx);
            for sign in entry.signs.iter() {
                postings.add(*sign, idx);
            }
            max_entry_len = max_entry_len.max(entry.signs.len());
            languages.extend(entry.translations.keys().cloned());
        }
        postings.finalize();
        languages.insert(TRANSLITERATION.to_string());

        tracing::info!(
            entries = deduped.len(),
            distinct_signs = postings.sign_count(),
            max_entry_len,
            "dictionary index built"
        );

        Ok(Self {
            entries: deduped.into_iter().map(Arc::new).collect(),
            by_id,
            trie,
            postings,
            max_entry_len,
            languages,
        })
    }

    fn resolve(&self, indices: Vec<u32>) -> Vec<Arc<DictionaryEntry>> {
        indices
            .into_iter()
            .map(|idx| Arc::clone(&self.entries[idx as usize]))
            .collect()
    }

    /// All entries whose canonical sequence equals the argument exactly.
    pub fn lookup_exact(&self, sequence: &SignSequence) -> Vec<Arc<DictionaryEntry>> {
        self.resolve(self.trie.lookup_exact(sequence.signs()))
    }

    /// All entries whose canonical sequence starts with the argument.
    pub fn lookup_prefix(&self, sequence: &SignSequence) -> Vec<Arc<DictionaryEntry>> {
        self.resolve(self.trie.lookup_prefix(sequence.signs()))
    }

    /// Entry indices containing `sign` at any position (posting list).
    pub fn entries_containing(&self, sign: &Sign) -> &[u32] {
        self.postings.get(sign)
    }

    /// Union of posting lists over a window of candidate signs.
    pub fn entries_sharing_any(&self, signs: impl IntoIterator<Item = Sign>) -> Vec<u32> {
        self.postings.union(signs)
    }

    /// Find every dictionary headword occurring contiguously in `sequence`.
    ///
    /// Sliding-window exact segmentation: one trie walk per start offset.
    /// Results are ordered by span start, then span end, then entry id.
    pub fn entries_in_sequence(
        &self,
        sequence: &SignSequence,
    ) -> Vec<(Span, Arc<DictionaryEntry>)> {
        let signs = sequence.signs();
        let mut out = Vec::new();
        for start in 0..signs.len() {
            for (consumed, indices) in self.trie.walk_terminals(&signs[start..]) {
                let span = Span::new(start, start + consumed);
                for &idx in indices {
                    out.push((span, Arc::clone(&self.entries[idx as usize])));
                }
            }
        }
        out.sort_by(|(sa, ea), (sb, eb)| {
            (sa.start, sa.end, ea.id).cmp(&(sb.start, sb.end, eb.id))
        });
        out
    }

    /// Headword search: entries whose sequence matches `sequence` under the
    /// given mode.
    ///
    /// `Contains` is seeded from the posting list of the first query sign, so
    /// it never scans entries that share no sign with the query.
    pub fn search_words(
        &self,
        sequence: &SignSequence,
        mode: MatchMode,
    ) -> Vec<Arc<DictionaryEntry>> {
        match mode {
            MatchMode::Exact => self.lookup_exact(sequence),
            MatchMode::StartsWith => self.lookup_prefix(sequence),
            MatchMode::Contains => {
                let needle = sequence.signs();
                let candidates = self.postings.get(&needle[0]);
                let mut out = Vec::new();
                for &idx in candidates {
                    let entry = &self.entries[idx as usize];
                    let hay = entry.signs.signs();
                    if hay.len() >= needle.len()
                        && hay.windows(needle.len()).any(|w| w == needle)
                    {
                        out.push(Arc::clone(entry));
                    }
                }
                out
            }
        }
    }

    /// Entries whose translation in `lang` contains `term` (case-insensitive
    /// substring). `lang` may be [`TRANSLITERATION`].
    pub fn search_translations(
        &self,
        term: &str,
        lang: &str,
    ) -> Result<Vec<Arc<DictionaryEntry>>, QueryError> {
        if !self.languages.contains(lang) {
            return Err(QueryError::UnknownLanguage { lang: lang.into() });
        }
        let needle = term.to_lowercase();
        let out = self
            .entries
            .iter()
            .filter(|entry| {
                let text = if lang == TRANSLITERATION {
                    Some(&entry.transliteration)
                } else {
                    entry.translations.get(lang)
                };
                text.is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(out)
    }

    /// Fetch an entry by identifier.
    pub fn entry(&self, id: EntryId) -> Option<&Arc<DictionaryEntry>> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx as usize])
    }

    /// Fetch an entry by its dense table index (used with posting lists).
    pub fn entry_at(&self, index: u32) -> &Arc<DictionaryEntry> {
        &self.entries[index as usize]
    }

    /// All entries in id order.
    pub fn entries(&self) -> &[Arc<DictionaryEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the longest canonical sequence in the dictionary.
    pub fn max_entry_len(&self) -> usize {
        self.max_entry_len
    }

    /// Number of distinct signs occurring across all entries.
    pub fn sign_count(&self) -> usize {
        self.postings.sign_count()
    }

    /// Languages available for translation search (includes
    /// [`TRANSLITERATION`]).
    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }
}
