//! sesh-medu HTTP boundary service.
//!
//! Thin REST wrapper around one shared [`Engine`]:
//!
//! - `GET  /health` — server status
//! - `GET  /info` — dictionary statistics
//! - `POST /translation` — every dictionary word in a sign sequence, with
//!   spans and translations
//! - `POST /suggest` — ranked suggestions with per-request matching options
//! - `POST /reload` — re-read the lexicon file and swap the index atomically
//!
//! Build and run: `cargo run --features server --bin sesh-medu-server`

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use sesh_medu::engine::{Engine, EngineInfo, SuggestOptions};
use sesh_medu::index::{DictionaryIndex, IndexConfig};
use sesh_medu::load;
use sesh_medu::sign::{QuerySequence, SignSequence};

// ── Server state ──────────────────────────────────────────────────────────

struct ServerState {
    engine: Engine,
    lexicon_path: PathBuf,
}

// ── Request/response types ────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    entries: usize,
}

#[derive(Deserialize)]
struct TranslationRequest {
    sequence: Vec<String>,
}

#[derive(Serialize)]
struct TranslationMatch {
    start: usize,
    end: usize,
    sequence: Vec<String>,
    transliteration: String,
    translations: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct SuggestRequest {
    signs: Vec<String>,
    #[serde(default = "default_max_edit_cost")]
    max_edit_cost: u32,
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(default = "default_allow_group")]
    allow_sign_group_merge: bool,
}

fn default_max_edit_cost() -> u32 {
    SuggestOptions::default().max_edit_cost
}

fn default_max_results() -> usize {
    SuggestOptions::default().max_results
}

fn default_allow_group() -> bool {
    SuggestOptions::default().allow_sign_group_merge
}

#[derive(Serialize)]
struct SuggestionResponse {
    entry_id: u64,
    signs: Vec<String>,
    transliteration: String,
    translations: BTreeMap<String, String>,
    start: usize,
    end: usize,
    exact: bool,
    score: f32,
}

#[derive(Serialize)]
struct ReloadResponse {
    reloaded: bool,
    entries: usize,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        entries: state.engine.info().entry_count,
    })
}

async fn info(State(state): State<Arc<ServerState>>) -> Json<EngineInfo> {
    Json(state.engine.info())
}

async fn translation(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<Vec<TranslationMatch>>, (StatusCode, String)> {
    let sequence = SignSequence::parse(&request.sequence.join(" "))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let matches = state
        .engine
        .segment(&sequence)
        .into_iter()
        .map(|(span, entry)| TranslationMatch {
            start: span.start,
            end: span.end,
            sequence: entry.signs.iter().map(|s| s.to_string()).collect(),
            transliteration: entry.transliteration.clone(),
            translations: entry.translations.clone(),
        })
        .collect();
    Ok(Json(matches))
}

async fn suggest(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<Vec<SuggestionResponse>>, (StatusCode, String)> {
    let query = QuerySequence::parse_tokens(&request.signs)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let options = SuggestOptions {
        max_edit_cost: request.max_edit_cost,
        max_results: request.max_results,
        allow_sign_group_merge: request.allow_sign_group_merge,
    };

    let suggestions = state
        .engine
        .suggest(&query, &options)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let out = suggestions
        .into_iter()
        .map(|s| SuggestionResponse {
            entry_id: s.entry.id.get(),
            signs: s.entry.signs.iter().map(|sign| sign.to_string()).collect(),
            transliteration: s.entry.transliteration.clone(),
            translations: s.entry.translations.clone(),
            start: s.span.start,
            end: s.span.end,
            exact: s.is_exact(),
            score: s.score,
        })
        .collect();
    Ok(Json(out))
}

async fn reload(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    let index = build_index(&state.lexicon_path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let entries = index.len();
    state.engine.reload(index);
    Ok(Json(ReloadResponse {
        reloaded: true,
        entries,
    }))
}

fn build_index(path: &PathBuf) -> Result<DictionaryIndex, sesh_medu::error::SeshError> {
    let entries = load::load_entries(path)?;
    Ok(DictionaryIndex::build(entries, &IndexConfig::default())?)
}

// ── Main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("SESH_SERVER_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SESH_SERVER_PORT").unwrap_or_else(|_| "8100".to_string());
    let addr = format!("{bind}:{port}");

    let lexicon_path = PathBuf::from(
        std::env::var("SESH_DICTIONARY").unwrap_or_else(|_| "lexicon.json".to_string()),
    );

    let index = build_index(&lexicon_path).unwrap_or_else(|e| {
        tracing::error!("failed to load lexicon {}: {e}", lexicon_path.display());
        std::process::exit(1);
    });

    let state = Arc::new(ServerState {
        engine: Engine::new(index),
        lexicon_path,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/translation", post(translation))
        .route("/suggest", post(suggest))
        .route("/reload", post(reload))
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("sesh-medu server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
