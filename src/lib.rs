//! # sesh-medu
//!
//! A dictionary suggestion engine for transcribed Egyptian hieroglyphs.
//! Given a sequence of Gardiner sign codes (possibly with uncertain readings
//! per position), it returns a ranked list of dictionary entries whose
//! canonical sign sequences plausibly correspond to spans of the input.
//!
//! ## Architecture
//!
//! - **Sign alphabet** (`sign`): Gardiner code normalization, sequences,
//!   per-position ambiguity sets
//! - **Dictionary index** (`index`): sign trie + inverted posting lists over
//!   immutable entries
//! - **Approximate matcher** (`matcher`): bounded banded-DP edit search with
//!   a tunable sign-level cost model
//! - **Ranker** (`rank`): total-order scoring of match candidates
//! - **Engine** (`engine`): reloadable snapshot facade with a per-snapshot
//!   result cache
//! - **Lexicon I/O** (`load`): TLA-style JSON lemma files
//!
//! ## Library usage
//!
//! ```no_run
//! use sesh_medu::engine::{Engine, SuggestOptions};
//! use sesh_medu::index::{DictionaryIndex, IndexConfig};
//! use sesh_medu::load;
//! use sesh_medu::sign::QuerySequence;
//!
//! let entries = load::load_entries("lexicon.json").unwrap();
//! let index = DictionaryIndex::build(entries, &IndexConfig::default()).unwrap();
//! let engine = Engine::new(index);
//!
//! let query = QuerySequence::parse_tokens(&["G1", "D21", "X1"]).unwrap();
//! for suggestion in engine.suggest(&query, &SuggestOptions::default()).unwrap() {
//!     println!("{} {}", suggestion.entry.transliteration, suggestion.score);
//! }
//! ```

pub mod engine;
pub mod error;
pub mod index;
pub mod load;
pub mod matcher;
pub mod rank;
pub mod sign;
