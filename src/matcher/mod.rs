//! Approximate matcher: bounded edit search over the dictionary index.
//!
//! Given a query sequence, explores dictionary entries reachable within a
//! cost budget from some contiguous query span, using the index's posting
//! lists to seed candidates and a banded dynamic program to score them. An
//! empty result is a valid, expected outcome — "no dictionary word found" is
//! never an error.

pub mod cost;
pub mod search;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::index::DictionaryEntry;
use crate::sign::Span;

pub use cost::{CostModel, EDIT_UNIT, MatchBudget};
pub use search::find_candidates;

/// A transient match result: one dictionary entry reachable from one query
/// span within the budget. Created by the matcher, re-scored by the ranker,
/// discarded after the response is built.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub entry: Arc<DictionaryEntry>,
    /// Query span the match covers.
    pub span: Span,
    /// Accumulated edit cost in deci-edit units; 0 means exact.
    pub cost: u32,
}

impl MatchCandidate {
    pub fn is_exact(&self) -> bool {
        self.cost == 0
    }

    /// Cost expressed in full edits.
    pub fn cost_edits(&self) -> f32 {
        self.cost as f32 / EDIT_UNIT as f32
    }
}

/// Cooperative cancellation signal for an in-flight search.
///
/// The matcher checks the token between bounded-search steps, so an abandoned
/// request (client disconnect) releases compute promptly instead of running
/// to completion. Cancellation truncates results; it never raises an error.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
