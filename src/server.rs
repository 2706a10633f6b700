// src/server.rs
// =============================================================================
// HTTP service around the Analyzer.
//
//   POST /analyze   {"url": "...", "maxDepth": 3}  -> outcome
//   POST /cancel                                   -> {"acknowledged": true, ...}
//   GET  /progress                                 -> {"active": false} | snapshot
//   GET  /health                                   -> "ok"
//
// The caller is identified by the `x-caller-id` header. /analyze holds its
// request open until the crawl ends; /cancel and /progress are answered
// immediately from the session registry while it runs.
// =============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::analysis::{Analyzer, DEFAULT_DEPTH};
use crate::session::CallerId;

pub const CALLER_HEADER: &str = "x-caller-id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub url: String,
    pub max_depth: Option<i64>,
}

pub fn router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/cancel", post(cancel))
        .route("/progress", get(progress))
        .route("/health", get(|| async { "ok" }))
        .with_state(analyzer)
}

pub async fn serve(analyzer: Arc<Analyzer>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "listening");
    println!("🌐 Serving on http://{}", local_addr);
    println!("   Try: curl -X POST http://{}/analyze -H '{}: me' -H 'content-type: application/json' -d '{{\"url\":\"https://github.com/rust-lang/log\"}}'", local_addr, CALLER_HEADER);

    axum::serve(listener, router(analyzer)).await?;
    Ok(())
}

// Reads the caller identity, or answers 400 when it is missing
fn caller_from(headers: &HeaderMap) -> Result<CallerId, Response> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(CallerId::new)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("missing {} header", CALLER_HEADER) })),
            )
                .into_response()
        })
}

async fn analyze(
    State(analyzer): State<Arc<Analyzer>>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let caller = match caller_from(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let max_depth = request.max_depth.unwrap_or(DEFAULT_DEPTH as i64);
    let outcome = analyzer
        .start_analysis(&caller, &request.url, max_depth)
        .await;
    Json(outcome).into_response()
}

async fn cancel(State(analyzer): State<Arc<Analyzer>>, headers: HeaderMap) -> Response {
    match caller_from(&headers) {
        Ok(caller) => Json(analyzer.request_cancel(&caller)).into_response(),
        Err(response) => response,
    }
}

async fn progress(State(analyzer): State<Arc<Analyzer>>, headers: HeaderMap) -> Response {
    match caller_from(&headers) {
        Ok(caller) => Json(analyzer.query_progress(&caller)).into_response(),
        Err(response) => response,
    }
}
