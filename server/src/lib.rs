use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hashdex_core::{
    DocId, Engine, IndexConfig, IndexError, NormalizationType, PostingsList, QueryType, RankingType,
    SearchConfig,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_query_type", rename = "type")]
    pub query_type: QueryType,
    #[serde(default = "default_ranking")]
    pub ranking: RankingType,
    #[serde(default = "default_norm")]
    pub norm: NormalizationType,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_query_type() -> QueryType { QueryType::Ranked }
fn default_ranking() -> RankingType { RankingType::TfIdf }
fn default_norm() -> NormalizationType { NormalizationType::DocumentLength }
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub name: String,
    pub snippet: Option<String>,
}

/// Everything needed to serve searches and to rebuild the index in place.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Engine>>,
    pub index_config: IndexConfig,
    pub search_config: SearchConfig,
    /// Source documents, used for snippets, `/doc` text and rebuilds.
    pub corpus: Option<PathBuf>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn open(index_config: IndexConfig, search_config: SearchConfig, corpus: Option<PathBuf>) -> Result<Self> {
        let engine = Engine::open(index_config.clone(), search_config.clone())?;
        tracing::info!(dir = %index_config.dir.display(), docs = engine.num_documents(), "engine ready");
        Ok(Self {
            engine: Arc::new(RwLock::new(engine)),
            index_config,
            search_config,
            corpus,
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
        })
    }
}

pub fn build_app(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<IndexError> for ApiError {
    fn from(e: IndexError) -> Self {
        if e.is_corruption() {
            tracing::error!(error = %e, "index is corrupt, rebuild required");
        } else {
            tracing::error!(error = %e, "index error");
        }
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let query = hashdex_core::Query::parse(&params.q);
    let k = params.k.clamp(1, 100);

    let engine = state.engine.clone();
    let (query_type, ranking, norm) = (params.query_type, params.ranking, params.norm);
    let found = tokio::task::spawn_blocking(move || -> Result<Option<(usize, Vec<(DocId, f64, String)>)>, IndexError> {
        let guard = engine.read();
        let Some(list) = guard.search(&query, query_type, ranking, norm)? else {
            return Ok(None);
        };
        Ok(Some((list.len(), top_hits(&guard, &list, k))))
    })
    .await??;

    let Some((total_hits, top)) = found else {
        return Err(ApiError(StatusCode::BAD_REQUEST, "no query".into()));
    };

    let raw_terms: Vec<String> = params.q.split_whitespace().map(|s| s.to_lowercase()).collect();
    let results = top
        .into_iter()
        .map(|(doc_id, score, name)| {
            let snippet = state
                .corpus
                .as_ref()
                .and_then(|root| snippet_from_file(&root.join(&name), &raw_terms));
            SearchHit { doc_id, score, name, snippet }
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(q = %params.q, total_hits, took_ms = elapsed.as_millis() as u64, "search");
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

fn top_hits(engine: &Engine, list: &PostingsList, k: usize) -> Vec<(DocId, f64, String)> {
    list.iter()
        .take(k)
        .map(|e| {
            let name = engine.doc_info(e.doc_id()).map(|d| d.name.clone()).unwrap_or_default();
            (e.doc_id(), e.score(), name)
        })
        .collect()
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<serde_json::Value>, ApiError> {
    let info = state.engine.read().doc_info(doc_id).cloned();
    let Some(info) = info else {
        return Err(ApiError(StatusCode::NOT_FOUND, "not found".into()));
    };
    let mut obj = json!({
        "doc_id": doc_id,
        "name": info.name,
        "token_count": info.token_count,
        "euclidean_length": info.euclidean_length,
    });
    if let Some(root) = &state.corpus {
        if let Ok(text) = std::fs::read_to_string(root.join(&info.name)) {
            obj["text"] = serde_json::Value::String(text);
        }
    }
    Ok(Json(obj))
}

/// Rebuild the index from the corpus with the tokenizer settings of the
/// current index, then swap in a freshly opened engine. Searches wait on the
/// write guard for the whole rebuild. A failed build leaves the current index
/// in place and serving.
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let Some(corpus) = state.corpus.clone() else {
        return Err(ApiError(StatusCode::BAD_REQUEST, "server was started without --corpus".into()));
    };

    let report = tokio::task::spawn_blocking(move || -> Result<indexer::BuildReport, ApiError> {
        let mut guard = state.engine.write();
        let config = state.index_config.clone().with_tokenizer(guard.tokenizer_config().clone());
        let report = indexer::build_index(&corpus, config.clone(), &[]).map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "rebuild failed, keeping the current index");
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        })?;
        *guard = Engine::open(config, state.search_config.clone())?;
        Ok(report)
    })
    .await??;

    tracing::info!(documents = report.documents, terms = report.summary.terms, "index rebuilt");
    Ok(Json(json!({
        "documents": report.documents,
        "skipped": report.skipped,
        "terms": report.summary.terms,
        "collisions": report.summary.collisions,
    })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError(StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

fn snippet_from_file(path: &std::path::Path, raw_terms: &[String]) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    if text.is_empty() { return None; }
    let pattern = terms_pattern(raw_terms);
    let snippet = match pattern.as_ref().and_then(|p| p.find(&text)).map(|m| m.start()) {
        Some(idx) => {
            let start = floor_char_boundary(&text, idx.saturating_sub(100));
            let end = floor_char_boundary(&text, (idx + 200).min(text.len()));
            text[start..end].to_string()
        }
        None => text.chars().take(200).collect(),
    };
    Some(match &pattern {
        Some(p) => highlight_terms(&snippet, p),
        None => snippet,
    })
}

/// One case-insensitive matcher for all query terms; `*` matches any run of
/// word characters.
fn terms_pattern(terms: &[String]) -> Option<regex::Regex> {
    let alternatives: Vec<String> = terms
        .iter()
        .filter(|t| !t.trim_matches('*').is_empty())
        .map(|t| t.split('*').map(regex::escape).collect::<Vec<_>>().join(r"\w*"))
        .collect();
    if alternatives.is_empty() { return None; }
    regex::RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn highlight_terms(snippet: &str, pattern: &regex::Regex) -> String {
    pattern.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string()
}
