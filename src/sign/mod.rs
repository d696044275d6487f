//! Sign alphabet and normalizer.
//!
//! A [`Sign`] is the atomic unit of the engine: one normalized Gardiner code
//! (category + number + optional variant suffix). Raw transcription tokens are
//! canonicalized by [`normalize`]; positions with several possible readings
//! (damaged or uncertain glyphs) are expanded by [`expand_ambiguous`]. Both
//! are pure functions over the fixed alphabet table in [`alphabet`].

pub mod alphabet;
pub mod sequence;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SignError;

pub use alphabet::Category;
pub use sequence::{QueryPosition, QuerySequence, SignSequence, Span};

/// A normalized Gardiner sign code.
///
/// Immutable value type; equality is exact code equality after normalization,
/// so `g1`, `G1` and `G1 ` all compare equal once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sign {
    /// Gardiner category.
    pub category: Category,
    /// Number within the category (e.g. the 21 in `D21`).
    pub number: u16,
    /// Optional lowercase variant suffix (e.g. the `a` in `N35a`).
    pub variant: Option<char>,
}

impl Sign {
    /// Construct a sign directly from its parts.
    pub fn new(category: Category, number: u16) -> Self {
        Self {
            category,
            number,
            variant: None,
        }
    }

    /// Attach a variant suffix.
    pub fn with_variant(mut self, variant: char) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Whether two signs belong to the same Gardiner category.
    pub fn same_category(&self, other: &Sign) -> bool {
        self.category == other.category
    }
}

impl std::fmt::Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.category, self.number)?;
        if let Some(v) = self.variant {
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Compiled sign-code syntax: category prefix, number, optional variant.
///
/// Two-letter categories are listed before the single letters so that `Aa15`
/// is not parsed as category `A` with a stray `a`.
fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)(Aa|NL|NU|Ff|[A-IK-Z])([0-9]{1,3})([a-z])?$")
            .expect("sign code regex is valid")
    })
}

/// Canonicalize one raw transcription token into a [`Sign`].
///
/// Accepts any casing and surrounding whitespace; fails with
/// [`SignError::InvalidSignCode`] when the token does not denote exactly one
/// known Gardiner code. Grouping notation (`G1:D21`, `G1*D21`) is not a
/// single sign; split it at the sequence level first (see
/// [`SignSequence::parse`]).
pub fn normalize(raw: &str) -> Result<Sign, SignError> {
    let token = raw.trim();
    let caps = code_regex()
        .captures(token)
        .ok_or_else(|| SignError::InvalidSignCode { token: raw.into() })?;

    let category = alphabet::lookup(&caps[1]).ok_or_else(|| SignError::InvalidSignCode {
        token: raw.into(),
    })?;
    let number: u16 = caps[2]
        .parse()
        .map_err(|_| SignError::InvalidSignCode { token: raw.into() })?;
    if number == 0 {
        return Err(SignError::InvalidSignCode { token: raw.into() });
    }
    let variant = caps
        .get(3)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase());

    Ok(Sign {
        category,
        number,
        variant,
    })
}

/// Expand one raw query position into its candidate sign readings.
///
/// Alternative readings are separated by `|` (e.g. `"G1|G4"` for a damaged
/// bird sign); a trailing `?` marks the whole position as uncertain and is
/// stripped. Returns at least one sign or fails with
/// [`SignError::UnresolvedSign`] carrying the query position. Unparsable
/// alternatives are dropped as long as at least one reading survives.
pub fn expand_ambiguous(raw: &str, position: usize) -> Result<Vec<Sign>, SignError> {
    let cleaned = raw.trim().trim_end_matches('?');
    let mut readings: Vec<Sign> = cleaned
        .split('|')
        .filter_map(|alt| normalize(alt).ok())
        .collect();
    readings.dedup();

    if readings.is_empty() {
        return Err(SignError::UnresolvedSign { position });
    }
    Ok(readings)
}
