//! Lexicon file loading and saving.
//!
//! The on-disk format is a JSON map from entry id to a record carrying the
//! headword as a list of sign codes, translations keyed by language, and an
//! optional frequency weight:
//!
//! ```json
//! {
//!   "550": {
//!     "word": ["G1", "D21"],
//!     "translations": { "transliteration": "Ar", "en": "to oppress" },
//!     "weight": 0.8
//!   }
//! }
//! ```
//!
//! The transliteration rides inside the translations map under the
//! `"transliteration"` key, matching the TLA-derived lemma files this crate
//! ships against. Loading is all-or-nothing: one bad entry fails the whole
//! file, so an index is never built from partially valid data.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::index::{DictionaryEntry, EntryId, TRANSLITERATION};
use crate::sign::SignSequence;

#[derive(Debug, Serialize, Deserialize)]
struct RawEntry {
    word: Vec<String>,
    #[serde(default)]
    translations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    weight: f32,
}

fn is_zero(weight: &f32) -> bool {
    *weight == 0.0
}

/// Load and validate every entry of a lexicon file.
pub fn load_entries(path: impl AsRef<Path>) -> Result<Vec<DictionaryEntry>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io { source })?;
    let raw: BTreeMap<String, RawEntry> =
        serde_json::from_str(&text).map_err(|e| LoadError::Parse {
            message: e.to_string(),
        })?;

    let mut entries = Vec::with_capacity(raw.len());
    for (raw_id, record) in raw {
        entries.push(convert_entry(&raw_id, record)?);
    }
    tracing::info!(path = %path.display(), entries = entries.len(), "lexicon loaded");
    Ok(entries)
}

/// Write entries back out in the same lexicon format.
pub fn save_entries(
    path: impl AsRef<Path>,
    entries: &[DictionaryEntry],
) -> Result<(), LoadError> {
    let mut raw: BTreeMap<String, RawEntry> = BTreeMap::new();
    for entry in entries {
        let mut translations = entry.translations.clone();
        if !entry.transliteration.is_empty() {
            translations.insert(TRANSLITERATION.to_string(), entry.transliteration.clone());
        }
        raw.insert(
            entry.id.to_string(),
            RawEntry {
                word: entry.signs.iter().map(|s| s.to_string()).collect(),
                translations,
                weight: entry.weight,
            },
        );
    }
    let text = serde_json::to_string_pretty(&raw).map_err(|e| LoadError::Parse {
        message: e.to_string(),
    })?;
    fs::write(path, text).map_err(|source| LoadError::Io { source })
}

fn convert_entry(raw_id: &str, record: RawEntry) -> Result<DictionaryEntry, LoadError> {
    let bad = |message: String| LoadError::BadEntry {
        entry_id: raw_id.to_string(),
        message,
    };

    let numeric: u64 = raw_id
        .parse()
        .map_err(|_| bad("entry id must be a positive integer".into()))?;
    let id = EntryId::new(numeric).ok_or_else(|| bad("entry id must be non-zero".into()))?;

    let signs = record
        .word
        .iter()
        .map(|code| crate::sign::normalize(code))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| bad(e.to_string()))?;
    let signs = SignSequence::new(signs).map_err(|e| bad(e.to_string()))?;

    let mut translations = record.translations;
    let transliteration = translations.remove(TRANSLITERATION).unwrap_or_default();

    let mut entry = DictionaryEntry::new(id, signs, transliteration).with_weight(record.weight);
    entry.translations = translations;
    Ok(entry)
}
