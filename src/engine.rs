//! Suggestion engine facade.
//!
//! The [`Engine`] ties the index, matcher, and ranker together behind one
//! handle that request threads share. The index lives in an immutable
//! snapshot behind an `RwLock<Arc<_>>`: a request clones the `Arc` once and
//! runs against exactly that index version end to end, while [`Engine::reload`]
//! swaps in a freshly built snapshot without waiting for in-flight requests.
//! The per-snapshot suggestion cache rides in the snapshot, so a reload drops
//! every stale cached result for free.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::error::QueryError;
use crate::index::{DictionaryEntry, DictionaryIndex, EntryId, MatchMode};
use crate::matcher::{self, CancelToken, CostModel, MatchBudget, MatchCandidate};
use crate::rank::{self, Suggestion};
use crate::sign::{QuerySequence, SignSequence, Span};

/// User-facing knobs for one `suggest` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Maximum edit distance, in whole edits, a candidate may accumulate.
    pub max_edit_cost: u32,
    /// Maximum number of suggestions returned; must be positive.
    pub max_results: usize,
    /// Whether two adjacent query signs may match one dictionary sign and
    /// vice versa (sign-group transcription variants).
    pub allow_sign_group_merge: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            max_edit_cost: 2,
            max_results: 10,
            allow_sign_group_merge: true,
        }
    }
}

impl SuggestOptions {
    /// Validate before any search work starts.
    fn validate(&self) -> Result<(), QueryError> {
        if self.max_results == 0 {
            return Err(QueryError::InvalidOptions {
                message: "max_results must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Cache key: stable query rendering plus every option that affects results.
type CacheKey = (String, u32, usize, bool);

/// One immutable index version plus the result cache scoped to it.
struct Snapshot {
    index: Arc<DictionaryIndex>,
    cache: DashMap<CacheKey, Vec<Suggestion>>,
}

impl Snapshot {
    fn new(index: DictionaryIndex) -> Self {
        Self {
            index: Arc::new(index),
            cache: DashMap::new(),
        }
    }
}

/// Shared, reloadable suggestion engine.
///
/// Cheap to clone via `Arc<Engine>`; all methods take `&self`. The matcher
/// and ranker never touch shared mutable state, so any number of `suggest`
/// calls may run concurrently with each other and with `reload`.
pub struct Engine {
    snapshot: RwLock<Arc<Snapshot>>,
    cost_model: CostModel,
}

impl Engine {
    pub fn new(index: DictionaryIndex) -> Self {
        Self::with_cost_model(index, CostModel::default())
    }

    pub fn with_cost_model(index: DictionaryIndex, cost_model: CostModel) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::new(index))),
            cost_model,
        }
    }

    /// Clone the current snapshot handle. Never blocks longer than the swap
    /// inside `reload` takes.
    fn snapshot(&self) -> Arc<Snapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            // A panic while holding the write lock leaves the old snapshot
            // intact, so the poisoned value is still safe to read.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a freshly built index. In-flight requests finish against the
    /// snapshot they started with; new requests see only the new one.
    pub fn reload(&self, index: DictionaryIndex) {
        let entries = index.len();
        let next = Arc::new(Snapshot::new(index));
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!(entries, "dictionary reloaded");
    }

    /// Ranked suggestions for a query, using default cancellation (none).
    pub fn suggest(
        &self,
        query: &QuerySequence,
        options: &SuggestOptions,
    ) -> Result<Vec<Suggestion>, QueryError> {
        self.suggest_cancellable(query, options, &CancelToken::new())
    }

    /// Ranked suggestions with cooperative cancellation.
    ///
    /// Cancellation truncates the candidate set mid-search; whatever was
    /// found is still ranked and returned, never an error. Truncated results
    /// are not cached.
    pub fn suggest_cancellable(
        &self,
        query: &QuerySequence,
        options: &SuggestOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<Suggestion>, QueryError> {
        options.validate()?;
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let snapshot = self.snapshot();
        let key: CacheKey = (
            query.cache_key(),
            options.max_edit_cost,
            options.max_results,
            options.allow_sign_group_merge,
        );
        if let Some(hit) = snapshot.cache.get(&key) {
            tracing::debug!(query = %key.0, "suggestion cache hit");
            return Ok(hit.clone());
        }

        let budget = MatchBudget::from_edits(options.max_edit_cost, options.allow_sign_group_merge);

        // Exact segmentation probe first: every headword occurring verbatim
        // in the query becomes a cost-0 candidate without any edit search.
        let mut candidates = self.exact_probe(&snapshot.index, query);

        // The matcher re-finds the exact spans at cost 0 and adds everything
        // reachable within the budget; the ranker collapses duplicates.
        if budget.max_cost > 0 || candidates.is_empty() {
            candidates.extend(matcher::find_candidates(
                &snapshot.index,
                query,
                &self.cost_model,
                &budget,
                cancel,
            ));
        }

        let suggestions = rank::rank(candidates, query.len(), options.max_results);
        tracing::debug!(
            query = %key.0,
            results = suggestions.len(),
            "suggest completed"
        );

        if !cancel.is_cancelled() {
            snapshot.cache.insert(key, suggestions.clone());
        }
        Ok(suggestions)
    }

    /// Cost-0 candidates from the sliding-window exact segmentation, for
    /// queries whose positions are all certain.
    fn exact_probe(
        &self,
        index: &DictionaryIndex,
        query: &QuerySequence,
    ) -> Vec<MatchCandidate> {
        let signs: Option<Vec<_>> = query
            .positions()
            .iter()
            .map(|pos| match pos.candidates() {
                [single] => Some(*single),
                _ => None,
            })
            .collect();
        let Some(signs) = signs else {
            // Ambiguous positions go straight to the matcher, which resolves
            // them locally.
            return Vec::new();
        };
        let Ok(sequence) = SignSequence::new(signs) else {
            return Vec::new();
        };
        index
            .entries_in_sequence(&sequence)
            .into_iter()
            .map(|(span, entry)| MatchCandidate {
                entry,
                span,
                cost: 0,
            })
            .collect()
    }

    /// Every dictionary headword occurring contiguously in the sequence.
    pub fn segment(&self, sequence: &SignSequence) -> Vec<(Span, Arc<DictionaryEntry>)> {
        self.snapshot().index.entries_in_sequence(sequence)
    }

    /// Fetch one entry by identifier.
    pub fn lookup(&self, id: EntryId) -> Option<Arc<DictionaryEntry>> {
        self.snapshot().index.entry(id).cloned()
    }

    /// Headword search under the given match mode.
    pub fn search_words(
        &self,
        sequence: &SignSequence,
        mode: MatchMode,
    ) -> Vec<Arc<DictionaryEntry>> {
        self.snapshot().index.search_words(sequence, mode)
    }

    /// Translation/transliteration substring search.
    pub fn search_translations(
        &self,
        term: &str,
        lang: &str,
    ) -> Result<Vec<Arc<DictionaryEntry>>, QueryError> {
        self.snapshot().index.search_translations(term, lang)
    }

    /// Summary of the currently loaded dictionary.
    pub fn info(&self) -> EngineInfo {
        let snapshot = self.snapshot();
        EngineInfo {
            entry_count: snapshot.index.len(),
            distinct_signs: snapshot.index.sign_count(),
            max_entry_len: snapshot.index.max_entry_len(),
            languages: snapshot.index.languages().iter().cloned().collect(),
            cached_queries: snapshot.cache.len(),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("info", &self.info())
            .finish_non_exhaustive()
    }
}

/// Summary information about the engine state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineInfo {
    pub entry_count: usize,
    pub distinct_signs: usize,
    pub max_entry_len: usize,
    pub languages: Vec<String>,
    pub cached_queries: usize,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "sesh-medu engine info")?;
        writeln!(f, "  entries:        {}", self.entry_count)?;
        writeln!(f, "  distinct signs: {}", self.distinct_signs)?;
        writeln!(f, "  longest word:   {}", self.max_entry_len)?;
        writeln!(f, "  languages:      {}", self.languages.join(", "))?;
        writeln!(f, "  cached queries: {}", self.cached_queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexConfig, TRANSLITERATION};

    fn entry(id: u64, raw: &str, translit: &str) -> DictionaryEntry {
        DictionaryEntry::new(
            EntryId::new(id).unwrap(),
            SignSequence::parse(raw).unwrap(),
            translit,
        )
        .with_translation("en", format!("meaning of {translit}"))
        .with_weight(0.5)
    }

    fn sample_engine() -> Engine {
        let index = DictionaryIndex::build(
            vec![
                entry(1, "G1 D21", "Ar"),
                entry(2, "G1 D21 X1", "Art"),
                entry(3, "G1", "A"),
                entry(4, "N35 G1", "nA"),
            ],
            &IndexConfig::default(),
        )
        .unwrap();
        Engine::new(index)
    }

    fn query(tokens: &[&str]) -> QuerySequence {
        QuerySequence::parse_tokens(tokens).unwrap()
    }

    #[test]
    fn exact_entry_ranks_first_on_own_sequence() {
        let engine = sample_engine();
        let results = engine
            .suggest(&query(&["G1", "D21", "X1"]), &SuggestOptions::default())
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].entry.id.get(), 2);
        assert!(results[0].is_exact());
        assert_eq!(results[0].span, Span::new(0, 3));
    }

    #[test]
    fn zero_budget_returns_only_exact_matches() {
        let engine = sample_engine();
        let options = SuggestOptions {
            max_edit_cost: 0,
            ..SuggestOptions::default()
        };
        let results = engine.suggest(&query(&["G1", "D21"]), &options).unwrap();
        assert!(results.iter().all(|s| s.is_exact()));
        assert!(results.iter().any(|s| s.entry.id.get() == 1));
    }

    #[test]
    fn unknown_signs_yield_empty_not_error() {
        let engine = sample_engine();
        let results = engine
            .suggest(&query(&["W1", "W2"]), &SuggestOptions::default())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn invalid_options_rejected_before_search() {
        let engine = sample_engine();
        let options = SuggestOptions {
            max_results: 0,
            ..SuggestOptions::default()
        };
        let err = engine.suggest(&query(&["G1"]), &options).unwrap_err();
        assert!(matches!(err, QueryError::InvalidOptions { .. }));
    }

    #[test]
    fn ambiguous_position_matches_like_the_indexed_reading() {
        let engine = sample_engine();
        let ambiguous = engine
            .suggest(&query(&["G1|G4", "D21"]), &SuggestOptions::default())
            .unwrap();
        let fixed = engine
            .suggest(&query(&["G1", "D21"]), &SuggestOptions::default())
            .unwrap();
        let ids = |v: &[Suggestion]| -> Vec<(u64, Span, u32)> {
            v.iter().map(|s| (s.entry.id.get(), s.span, s.cost)).collect()
        };
        assert_eq!(ids(&ambiguous), ids(&fixed));
    }

    #[test]
    fn results_are_deterministic_and_cached() {
        let engine = sample_engine();
        let q = query(&["N35", "G1", "D21"]);
        let first = engine.suggest(&q, &SuggestOptions::default()).unwrap();
        assert_eq!(engine.info().cached_queries, 1);
        let second = engine.suggest(&q, &SuggestOptions::default()).unwrap();
        let ids = |v: &[Suggestion]| -> Vec<(u64, Span)> {
            v.iter().map(|s| (s.entry.id.get(), s.span)).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn larger_budget_never_drops_candidates() {
        let engine = sample_engine();
        let q = query(&["G1", "Z9"]);
        let narrow = engine
            .suggest(
                &q,
                &SuggestOptions {
                    max_edit_cost: 1,
                    max_results: 100,
                    ..SuggestOptions::default()
                },
            )
            .unwrap();
        let wide = engine
            .suggest(
                &q,
                &SuggestOptions {
                    max_edit_cost: 3,
                    max_results: 100,
                    ..SuggestOptions::default()
                },
            )
            .unwrap();
        for s in &narrow {
            assert!(
                wide.iter()
                    .any(|w| w.entry.id == s.entry.id && w.span == s.span),
                "candidate lost when budget grew: {} {}",
                s.entry.id,
                s.span
            );
        }
    }

    #[test]
    fn cancelled_search_returns_without_error_and_skips_cache() {
        let engine = sample_engine();
        let cancel = CancelToken::new();
        cancel.cancel();
        let results = engine
            .suggest_cancellable(&query(&["Z9", "Z10"]), &SuggestOptions::default(), &cancel)
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(engine.info().cached_queries, 0);
    }

    #[test]
    fn reload_swaps_index_and_drops_cache() {
        let engine = sample_engine();
        let q = query(&["G1", "D21"]);
        engine.suggest(&q, &SuggestOptions::default()).unwrap();
        assert_eq!(engine.info().cached_queries, 1);

        let replacement = DictionaryIndex::build(
            vec![entry(9, "D21 G1", "rA")],
            &IndexConfig::default(),
        )
        .unwrap();
        engine.reload(replacement);

        let info = engine.info();
        assert_eq!(info.entry_count, 1);
        assert_eq!(info.cached_queries, 0);
        assert!(engine.lookup(EntryId::new(9).unwrap()).is_some());
        assert!(engine.lookup(EntryId::new(1).unwrap()).is_none());
    }

    #[test]
    fn in_flight_snapshot_survives_reload() {
        let engine = Arc::new(sample_engine());
        // Grab a snapshot the way a request would, then reload underneath it.
        let before = engine.snapshot();
        let replacement = DictionaryIndex::build(
            vec![entry(9, "D21 G1", "rA")],
            &IndexConfig::default(),
        )
        .unwrap();
        engine.reload(replacement);

        assert_eq!(before.index.len(), 4);
        assert_eq!(engine.snapshot().index.len(), 1);
    }

    #[test]
    fn pass_throughs_reach_the_index() {
        let engine = sample_engine();
        let seq = SignSequence::parse("N35 G1 D21").unwrap();
        assert_eq!(engine.segment(&seq).len(), 3);
        assert_eq!(
            engine
                .search_words(&SignSequence::parse("G1").unwrap(), MatchMode::StartsWith)
                .len(),
            3
        );
        assert_eq!(engine.search_translations("nA", TRANSLITERATION).unwrap().len(), 1);
        let info = engine.info();
        assert_eq!(info.entry_count, 4);
        assert!(info.languages.contains(&"en".to_string()));
    }
}
