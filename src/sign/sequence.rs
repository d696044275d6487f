//! Sign sequences, query positions, and spans.
//!
//! A [`SignSequence`] is a non-empty ordered list of normalized signs: the
//! canonical form of a dictionary headword. A [`QuerySequence`] is the query
//! counterpart where each position may carry several candidate readings.
//! Ambiguity is a small explicit set per position, resolved locally at match
//! time — never a combinatorial expansion of the whole query.

use serde::{Deserialize, Serialize};

use crate::error::SignError;
use crate::sign::{self, Sign};

/// Half-open offset range `[start, end)` into a query sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "span must be non-empty");
        Self { start, end }
    }

    /// Number of query positions covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether two spans share any position.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A non-empty, order-significant sequence of normalized signs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignSequence(Vec<Sign>);

impl SignSequence {
    /// Wrap a sign list, rejecting the empty sequence.
    pub fn new(signs: Vec<Sign>) -> Result<Self, SignError> {
        if signs.is_empty() {
            return Err(SignError::EmptySequence);
        }
        Ok(Self(signs))
    }

    /// Parse a whole transcription string into a sequence.
    ///
    /// Tokens are separated by whitespace, `-`, or the Manuel de Codage
    /// grouping operators `:` (vertical) and `*` (horizontal); grouping is
    /// flattened into reading order.
    pub fn parse(raw: &str) -> Result<Self, SignError> {
        let signs = split_tokens(raw)
            .map(sign::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(signs)
    }

    pub fn signs(&self) -> &[Sign] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: the non-empty invariant is enforced at construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sign> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sign> {
        self.0.iter()
    }
}

impl std::fmt::Display for SignSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, sign) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{sign}")?;
        }
        Ok(())
    }
}

/// One position of a query: either a certain sign or a set of candidate
/// readings for a damaged/uncertain glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryPosition {
    Certain(Sign),
    OneOf(Vec<Sign>),
}

impl QueryPosition {
    /// The candidate readings at this position (at least one).
    pub fn candidates(&self) -> &[Sign] {
        match self {
            QueryPosition::Certain(sign) => std::slice::from_ref(sign),
            QueryPosition::OneOf(signs) => signs,
        }
    }

    /// Whether any candidate reading equals `sign`.
    pub fn matches(&self, sign: &Sign) -> bool {
        self.candidates().contains(sign)
    }

    /// Build from an expanded candidate set, collapsing singletons.
    pub fn from_candidates(mut candidates: Vec<Sign>, position: usize) -> Result<Self, SignError> {
        match candidates.len() {
            0 => Err(SignError::UnresolvedSign { position }),
            1 => Ok(QueryPosition::Certain(candidates.remove(0))),
            _ => Ok(QueryPosition::OneOf(candidates)),
        }
    }
}

/// A non-empty query: one [`QueryPosition`] per transcribed glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuerySequence(Vec<QueryPosition>);

impl QuerySequence {
    pub fn new(positions: Vec<QueryPosition>) -> Result<Self, SignError> {
        if positions.is_empty() {
            return Err(SignError::EmptySequence);
        }
        Ok(Self(positions))
    }

    /// Build a query of certain positions from a plain sign sequence.
    pub fn from_signs(sequence: &SignSequence) -> Self {
        Self(
            sequence
                .iter()
                .map(|s| QueryPosition::Certain(*s))
                .collect(),
        )
    }

    /// Parse raw query tokens, expanding per-position ambiguity markers.
    ///
    /// Each token goes through [`sign::expand_ambiguous`], so `"G1|G4"` and
    /// `"D21?"` are legal query positions.
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, SignError> {
        if tokens.is_empty() {
            return Err(SignError::EmptySequence);
        }
        let positions = tokens
            .iter()
            .enumerate()
            .map(|(i, tok)| {
                let candidates = sign::expand_ambiguous(tok.as_ref(), i)?;
                QueryPosition::from_candidates(candidates, i)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(positions))
    }

    pub fn positions(&self) -> &[QueryPosition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QueryPosition> {
        self.0.get(index)
    }

    /// Stable textual rendering, usable as a cache key.
    ///
    /// Candidate sets render in their given order, so two queries with the
    /// same readings in the same order share a key.
    pub fn cache_key(&self) -> String {
        let mut out = String::new();
        for (i, pos) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let mut first = true;
            for sign in pos.candidates() {
                if !first {
                    out.push('|');
                }
                out.push_str(&sign.to_string());
                first = false;
            }
        }
        out
    }
}

/// Split a raw transcription string on whitespace and grouping operators.
fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c.is_whitespace() || c == '-' || c == ':' || c == '*')
        .filter(|t| !t.is_empty())
}
