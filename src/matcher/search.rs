//! Bounded branch-and-bound search over candidate entries.
//!
//! For every start offset in the query, candidate entries are seeded from
//! the posting lists of the signs in the window under test; each candidate is
//! then scored with a banded dynamic program over (entry offset, query
//! offset) whose rows are pruned as soon as they exceed the budget. The DP is
//! an explicit table, not recursion, keeping memory bounded and cancellation
//! checks cheap.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::index::{DictionaryIndex, EntryId};
use crate::matcher::cost::{CostModel, MatchBudget};
use crate::matcher::{CancelToken, MatchCandidate};
use crate::sign::{QueryPosition, QuerySequence, Sign, Span};

const INF: u32 = u32::MAX;

/// Find all dictionary entries reachable within `budget` from some
/// contiguous span of `query`.
///
/// Ties in cost are retained; the same (entry, span) pair reached by several
/// alignments keeps its cheapest cost. Returns the empty list when nothing
/// is within budget, or a truncated (still valid) list when `cancel` fires
/// mid-search.
pub fn find_candidates(
    index: &DictionaryIndex,
    query: &QuerySequence,
    model: &CostModel,
    budget: &MatchBudget,
    cancel: &CancelToken,
) -> Vec<MatchCandidate> {
    let positions = query.positions();
    let window_len = index.max_entry_len() + budget.edits_ceil();

    // Start offsets are independent; scoring is data-parallel and the final
    // merge keeps output deterministic.
    let per_start: Vec<HashMap<(EntryId, Span), u32>> = (0..positions.len())
        .into_par_iter()
        .map(|start| scan_start_offset(index, positions, start, window_len, model, budget, cancel))
        .collect();

    let mut best: HashMap<(EntryId, Span), u32> = HashMap::new();
    for local in per_start {
        for (key, cost) in local {
            best.entry(key)
                .and_modify(|existing| *existing = (*existing).min(cost))
                .or_insert(cost);
        }
    }

    let mut out: Vec<MatchCandidate> = best
        .into_iter()
        .map(|((id, span), cost)| MatchCandidate {
            entry: std::sync::Arc::clone(
                index.entry(id).expect("candidate id came from this index"),
            ),
            span,
            cost,
        })
        .collect();
    out.sort_by_key(|c| (c.entry.id, c.span));
    out
}

/// Score every candidate entry against the query window starting at `start`.
fn scan_start_offset(
    index: &DictionaryIndex,
    positions: &[QueryPosition],
    start: usize,
    window_len: usize,
    model: &CostModel,
    budget: &MatchBudget,
    cancel: &CancelToken,
) -> HashMap<(EntryId, Span), u32> {
    let mut found = HashMap::new();
    if cancel.is_cancelled() {
        return found;
    }

    let remaining = positions.len() - start;
    let window_end = start + window_len.min(remaining);
    let window_signs = positions[start..window_end]
        .iter()
        .flat_map(|pos| pos.candidates().iter().copied());
    let candidates = index.entries_sharing_any(window_signs);

    // Cheapest way to absorb one surplus entry sign; used for the
    // branch-and-bound length prune below.
    let min_absorb = if budget.allow_group {
        model.deletion.min(model.group)
    } else {
        model.deletion
    };

    for (scanned, &entry_index) in candidates.iter().enumerate() {
        // Between bounded-search steps, not per DP cell.
        if scanned % 64 == 0 && cancel.is_cancelled() {
            break;
        }

        let entry = index.entry_at(entry_index);
        let entry_signs = entry.signs.signs();
        let surplus = entry_signs.len().saturating_sub(remaining) as u32;
        if surplus * min_absorb > budget.max_cost {
            continue;
        }

        score_entry(
            entry.id,
            entry_signs,
            positions,
            start,
            model,
            budget,
            &mut found,
        );
    }
    found
}

/// Banded edit-distance DP between one entry and the query suffix at `start`.
///
/// `dp[i][j]` is the cheapest alignment of the first `i` entry signs against
/// query positions `start..start+j`. Every `j ≥ 1` with `dp[m][j]` within
/// budget yields a candidate covering span `[start, start+j)`; the empty
/// sub-window `j = 0` is never a result.
fn score_entry(
    id: EntryId,
    entry_signs: &[Sign],
    positions: &[QueryPosition],
    start: usize,
    model: &CostModel,
    budget: &MatchBudget,
    found: &mut HashMap<(EntryId, Span), u32>,
) {
    let m = entry_signs.len();
    let remaining = positions.len() - start;
    // Spans longer than the entry plus the budget cannot stay within budget.
    let w = remaining.min(m + budget.edits_ceil());
    if w == 0 {
        return;
    }

    let cols = w + 1;
    let mut dp = vec![INF; (m + 1) * cols];
    dp[0] = 0;

    for i in 0..=m {
        for j in 0..=w {
            let here = dp[i * cols + j];
            if here == INF || here > budget.max_cost {
                continue;
            }

            // Extra query sign inside the span.
            if j < w {
                relax(&mut dp, i * cols + j + 1, here + model.insertion);
            }
            // Entry sign the query omitted.
            if i < m {
                relax(&mut dp, (i + 1) * cols + j, here + model.deletion);
            }
            // Match or substitute.
            if i < m && j < w {
                let sub = model.substitution(&positions[start + j], &entry_signs[i]);
                relax(&mut dp, (i + 1) * cols + j + 1, here + sub);
            }
            if budget.allow_group {
                // Merge: two adjacent query signs are one dictionary sign.
                if i < m && j + 1 < w {
                    let pair = [&positions[start + j], &positions[start + j + 1]];
                    if model.group_applies(&pair, &entry_signs[i]) {
                        relax(&mut dp, (i + 1) * cols + j + 2, here + model.group);
                    }
                }
                // Split: one query sign is two adjacent dictionary signs.
                if i + 1 < m && j < w {
                    let pos = [&positions[start + j]];
                    if model.group_applies(&pos, &entry_signs[i])
                        || model.group_applies(&pos, &entry_signs[i + 1])
                    {
                        relax(&mut dp, (i + 2) * cols + j + 1, here + model.group);
                    }
                }
            }
        }
    }

    for j in 1..=w {
        let cost = dp[m * cols + j];
        if cost <= budget.max_cost {
            let span = Span::new(start, start + j);
            found
                .entry((id, span))
                .and_modify(|existing| *existing = (*existing).min(cost))
                .or_insert(cost);
        }
    }
}

#[inline]
fn relax(dp: &mut [u32], index: usize, candidate: u32) {
    if candidate < dp[index] {
        dp[index] = candidate;
    }
}
