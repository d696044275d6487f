//! Ranker: orders match candidates into the final suggestion list.
//!
//! The ordering is a total order so that identical input always produces
//! identical output: exact matches first, then by edit cost, covered span
//! length, entry weight, and finally entry id and span start as deterministic
//! tie-breaks. No two distinct (entry, span) results compare equal.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::index::{DictionaryEntry, EntryId};
use crate::matcher::{EDIT_UNIT, MatchCandidate};
use crate::sign::Span;

/// The externally visible result: entry reference, covered span, confidence.
///
/// Constructed per request, never persisted.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub entry: Arc<DictionaryEntry>,
    /// Query span this suggestion covers.
    pub span: Span,
    /// Edit cost in deci-edit units; 0 for an exact match.
    pub cost: u32,
    /// Confidence in `(0, 1]`, derived from cost and span coverage.
    pub score: f32,
}

impl Suggestion {
    pub fn is_exact(&self) -> bool {
        self.cost == 0
    }
}

/// Score and order candidates, returning at most `max_results` suggestions.
///
/// Duplicate (entry, span) candidates are collapsed to their cheapest cost
/// before ordering; ties in cost are kept as distinct suggestions.
pub fn rank(
    candidates: Vec<MatchCandidate>,
    query_len: usize,
    max_results: usize,
) -> Vec<Suggestion> {
    let mut best: HashMap<(EntryId, Span), MatchCandidate> = HashMap::new();
    for candidate in candidates {
        let key = (candidate.entry.id, candidate.span);
        match best.get(&key) {
            Some(existing) if existing.cost <= candidate.cost => {}
            _ => {
                best.insert(key, candidate);
            }
        }
    }

    let mut suggestions: Vec<Suggestion> = best
        .into_values()
        .map(|c| {
            let score = confidence(c.cost, c.span.len(), query_len);
            Suggestion {
                entry: c.entry,
                span: c.span,
                cost: c.cost,
                score,
            }
        })
        .collect();

    suggestions.sort_by(compare);
    suggestions.truncate(max_results);
    suggestions
}

/// Total order over suggestions, best first.
fn compare(a: &Suggestion, b: &Suggestion) -> Ordering {
    (!a.is_exact())
        .cmp(&!b.is_exact())
        .then(a.cost.cmp(&b.cost))
        .then(b.span.len().cmp(&a.span.len()))
        .then(b.entry.weight.total_cmp(&a.entry.weight))
        .then(a.entry.id.cmp(&b.entry.id))
        .then(a.span.start.cmp(&b.span.start))
}

/// Confidence score: cheap and wide beats costly and narrow.
///
/// Entry weight deliberately stays out of the score so displayed confidences
/// remain comparable across dictionaries with different weight scales; weight
/// participates in the ordering instead.
fn confidence(cost: u32, span_len: usize, query_len: usize) -> f32 {
    let cost_edits = cost as f32 / EDIT_UNIT as f32;
    let coverage = span_len as f32 / query_len.max(1) as f32;
    (1.0 / (1.0 + cost_edits)) * (0.5 + 0.5 * coverage)
}
