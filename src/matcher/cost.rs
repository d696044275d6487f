//! Sign-level edit-cost model.
//!
//! Costs are integer deci-edit units (one full edit = [`EDIT_UNIT`]) so that
//! a substitution within the same Gardiner category can cost less than a full
//! edit while budgets stay exact integers. A misread bird for another bird is
//! a likelier transcription error than a bird for a loaf.
//!
//! All defaults are placeholders pending tuning against the real lemma
//! dataset; every knob lives here.

use crate::sign::{QueryPosition, Sign};

/// One full edit in cost units.
pub const EDIT_UNIT: u32 = 10;

/// Cost table for the bounded edit search.
#[derive(Debug, Clone)]
pub struct CostModel {
    /// Substituting a sign for another in the same Gardiner category.
    pub same_category_substitution: u32,
    /// Substituting a sign across categories.
    pub cross_category_substitution: u32,
    /// An extra sign in the query absent from the entry.
    pub insertion: u32,
    /// An entry sign the query omitted.
    pub deletion: u32,
    /// Two adjacent query signs matching one dictionary sign, or one query
    /// sign matching two adjacent dictionary signs (sign-group rule).
    pub group: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            same_category_substitution: 6,
            cross_category_substitution: EDIT_UNIT,
            insertion: EDIT_UNIT,
            deletion: EDIT_UNIT,
            group: 8,
        }
    }
}

impl CostModel {
    /// Cost of matching one query position against one dictionary sign.
    ///
    /// An ambiguous position is resolved locally: the cheapest candidate
    /// reading wins, never a combinatorial expansion of the query.
    pub fn substitution(&self, position: &QueryPosition, sign: &Sign) -> u32 {
        position
            .candidates()
            .iter()
            .map(|candidate| {
                if candidate == sign {
                    0
                } else if candidate.same_category(sign) {
                    self.same_category_substitution
                } else {
                    self.cross_category_substitution
                }
            })
            .min()
            .unwrap_or(self.cross_category_substitution)
    }

    /// Whether the group rule may fire for this (query pair, entry sign)
    /// combination: at least one reading of either query position must share
    /// the dictionary sign's category, so the rule models one glyph
    /// transcribed as two codes rather than discounting unrelated edits.
    pub fn group_applies(&self, positions: &[&QueryPosition], sign: &Sign) -> bool {
        positions.iter().any(|pos| {
            pos.candidates()
                .iter()
                .any(|candidate| candidate.same_category(sign))
        })
    }
}

/// Search budget derived from user-facing options.
#[derive(Debug, Clone, Copy)]
pub struct MatchBudget {
    /// Maximum accumulated cost in deci-edit units.
    pub max_cost: u32,
    /// Whether the sign-group merge/split rule is enabled.
    pub allow_group: bool,
}

impl MatchBudget {
    /// Budget allowing `max_edit_cost` full edits.
    pub fn from_edits(max_edit_cost: u32, allow_group: bool) -> Self {
        Self {
            max_cost: max_edit_cost.saturating_mul(EDIT_UNIT),
            allow_group,
        }
    }

    /// The budget rounded up to whole edits; bounds the search window.
    pub fn edits_ceil(&self) -> usize {
        self.max_cost.div_ceil(EDIT_UNIT) as usize
    }
}
