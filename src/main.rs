//! sesh CLI: hieroglyph dictionary suggestion engine.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;

use sesh_medu::engine::{Engine, SuggestOptions};
use sesh_medu::index::{DictionaryIndex, EntryId, IndexConfig, MatchMode, TRANSLITERATION};
use sesh_medu::load;
use sesh_medu::sign::{QuerySequence, SignSequence};

#[derive(Parser)]
#[command(name = "sesh", version, about = "Hieroglyph dictionary suggestion engine")]
struct Cli {
    /// Path to the JSON lexicon file.
    #[arg(long, global = true, default_value = "lexicon.json")]
    dictionary: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest dictionary words for a sign sequence, tolerating misreads.
    ///
    /// Positions accept ambiguity markers: "G1|G4" for alternative readings,
    /// a trailing "?" for an uncertain sign.
    Suggest {
        /// Query sign codes, one per transcribed glyph.
        signs: Vec<String>,

        /// Maximum edit distance a candidate may accumulate.
        #[arg(long, default_value = "2")]
        max_edit_cost: u32,

        /// Maximum number of suggestions.
        #[arg(long, default_value = "10")]
        max_results: usize,

        /// Disable the sign-group merge/split rule.
        #[arg(long)]
        no_group: bool,
    },

    /// List every dictionary word occurring contiguously in a sequence.
    Segment {
        /// Sign codes of the transcription.
        signs: Vec<String>,
    },

    /// Show one entry by its identifier.
    Lookup {
        /// Numeric entry id (TLA lemma id).
        id: u64,
    },

    /// Search headwords by sign sequence.
    Words {
        /// Sign codes of the needle.
        signs: Vec<String>,

        /// How the needle must relate to the headword.
        #[arg(long, value_enum, default_value = "exact")]
        mode: WordMode,
    },

    /// Search translations (or transliterations) by text.
    Translations {
        /// Search term, matched case-insensitively as a substring.
        term: String,

        /// Language code, or "transliteration".
        #[arg(long, default_value = TRANSLITERATION)]
        lang: String,
    },

    /// Show dictionary statistics.
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WordMode {
    Exact,
    StartsWith,
    Contains,
}

impl From<WordMode> for MatchMode {
    fn from(mode: WordMode) -> Self {
        match mode {
            WordMode::Exact => MatchMode::Exact,
            WordMode::StartsWith => MatchMode::StartsWith,
            WordMode::Contains => MatchMode::Contains,
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let entries = load::load_entries(&cli.dictionary)?;
    let index = DictionaryIndex::build(entries, &IndexConfig::default())?;
    let engine = Engine::new(index);

    match cli.command {
        Commands::Suggest {
            signs,
            max_edit_cost,
            max_results,
            no_group,
        } => {
            let query = QuerySequence::parse_tokens(&signs)?;
            let options = SuggestOptions {
                max_edit_cost,
                max_results,
                allow_sign_group_merge: !no_group,
            };
            let suggestions = engine.suggest(&query, &options)?;
            if suggestions.is_empty() {
                println!("No suggestions.");
            }
            for (i, s) in suggestions.iter().enumerate() {
                println!(
                    "  {}. {} \"{}\" {} (score {:.3}{})",
                    i + 1,
                    s.entry.signs,
                    s.entry.transliteration,
                    s.span,
                    s.score,
                    if s.is_exact() { ", exact" } else { "" },
                );
                for (lang, text) in &s.entry.translations {
                    println!("       {lang}: {text}");
                }
            }
        }

        Commands::Segment { signs } => {
            let sequence = parse_sequence(&signs)?;
            let found = engine.segment(&sequence);
            if found.is_empty() {
                println!("No dictionary words in sequence.");
            }
            for (span, entry) in found {
                println!("  {} {} \"{}\"", span, entry.signs, entry.transliteration);
            }
        }

        Commands::Lookup { id } => {
            let id = EntryId::new(id)
                .ok_or_else(|| miette::miette!("entry ids are positive integers"))?;
            match engine.lookup(id) {
                Some(entry) => {
                    println!("{} \"{}\"", entry.signs, entry.transliteration);
                    for (lang, text) in &entry.translations {
                        println!("  {lang}: {text}");
                    }
                }
                None => println!("No entry with id {id}."),
            }
        }

        Commands::Words { signs, mode } => {
            let sequence = parse_sequence(&signs)?;
            let hits = engine.search_words(&sequence, mode.into());
            println!("{} headword(s):", hits.len());
            for entry in hits {
                println!("  {} {} \"{}\"", entry.id, entry.signs, entry.transliteration);
            }
        }

        Commands::Translations { term, lang } => {
            let hits = engine.search_translations(&term, &lang)?;
            println!("{} entr(ies):", hits.len());
            for entry in hits {
                let text = if lang == TRANSLITERATION {
                    entry.transliteration.clone()
                } else {
                    entry.translations.get(&lang).cloned().unwrap_or_default()
                };
                println!("  {} {} \"{}\"", entry.id, entry.signs, text);
            }
        }

        Commands::Info => {
            println!("{}", engine.info());
        }
    }

    Ok(())
}

fn parse_sequence(signs: &[String]) -> Result<SignSequence> {
    Ok(SignSequence::parse(&signs.join(" "))?)
}
