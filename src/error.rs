//! Rich diagnostic error types for the sesh-medu engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.
//!
//! All of these errors are input-validation or build-time errors: they are
//! returned to the caller before any search work begins. The matcher itself
//! never fails mid-search — an unmatchable query is an empty result, not an
//! error — and no failed request can corrupt the shared index.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the sesh-medu engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SeshError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}

// ---------------------------------------------------------------------------
// Sign errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SignError {
    #[error("invalid sign code: \"{token}\"")]
    #[diagnostic(
        code(sesh::sign::invalid_code),
        help(
            "Sign codes follow the Gardiner scheme: a category letter \
             (A-Z except J, or Aa/NL/NU/Ff) followed by a number and an \
             optional lowercase variant suffix, e.g. \"G1\", \"D21\", \"N35a\". \
             Check the token for typos or unsupported notation."
        )
    )]
    InvalidSignCode { token: String },

    #[error("unresolved ambiguous sign at position {position}")]
    #[diagnostic(
        code(sesh::sign::unresolved),
        help(
            "An ambiguous query position must expand to at least one known \
             sign reading. Provide candidate readings as \"G1|G4\", or drop \
             the position from the query if the glyph is entirely illegible."
        )
    )]
    UnresolvedSign { position: usize },

    #[error("empty sign sequence")]
    #[diagnostic(
        code(sesh::sign::empty_sequence),
        help("Sign sequences must contain at least one sign.")
    )]
    EmptySequence,
}

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error("duplicate entry id: {entry_id}")]
    #[diagnostic(
        code(sesh::index::duplicate_entry),
        help(
            "Two dictionary entries share the same identifier. Entries with \
             identical sign sequences but different meanings are fine; \
             identifiers must be unique. Use DuplicatePolicy::ReplaceExisting \
             if last-write-wins is acceptable for your source data."
        )
    )]
    DuplicateEntry { entry_id: u64 },

    #[error("cannot build an index from an empty dictionary")]
    #[diagnostic(
        code(sesh::index::empty_dictionary),
        help("Provide at least one dictionary entry to DictionaryIndex::build.")
    )]
    EmptyDictionary,
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("empty query sequence")]
    #[diagnostic(
        code(sesh::query::empty),
        help("A suggestion query must contain at least one sign position.")
    )]
    EmptyQuery,

    #[error("invalid suggestion options: {message}")]
    #[diagnostic(
        code(sesh::query::invalid_options),
        help("Check SuggestOptions: max_results must be > 0.")
    )]
    InvalidOptions { message: String },

    #[error("unsupported translation language: \"{lang}\"")]
    #[diagnostic(
        code(sesh::query::unknown_language),
        help(
            "The loaded dictionary has no translations in this language. \
             Query EngineInfo for the list of available languages."
        )
    )]
    UnknownLanguage { lang: String },
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("I/O error reading dictionary: {source}")]
    #[diagnostic(
        code(sesh::load::io),
        help(
            "A filesystem operation failed. Check that the dictionary file \
             exists and is readable."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("dictionary parse error: {message}")]
    #[diagnostic(
        code(sesh::load::parse),
        help(
            "The dictionary file is not valid JSON in the expected lexicon \
             format: a map from entry id to {{\"word\": [...], \
             \"translations\": {{...}}}}. Check the file for truncation or \
             format drift."
        )
    )]
    Parse { message: String },

    #[error("bad dictionary entry \"{entry_id}\": {message}")]
    #[diagnostic(
        code(sesh::load::bad_entry),
        help(
            "One entry in the dictionary could not be converted into a \
             canonical sign sequence. Fix or remove the entry; the index is \
             never built from partially valid data."
        )
    )]
    BadEntry { entry_id: String, message: String },
}

/// Convenience alias for functions returning sesh-medu results.
pub type SeshResult<T> = std::result::Result<T, SeshError>;
