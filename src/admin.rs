// src/admin.rs

use crate::{
    error::{AppError, Result},
    monitoring::KeyHealthSummary,
    state::AppState,
    storage::KeyStatus,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const DEFAULT_FAILURE_REASON: &str = "marked failed by operator";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub keys: KeyHealthSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeysStatusResponse {
    /// Labels in rotation order. Secrets are never included.
    pub configured: Vec<String>,
    pub stale: bool,
    pub keys: BTreeMap<String, KeyStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkFailedRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectResponse {
    pub label: String,
    pub source: String,
}

/// Operations routes, mounted under `/admin`.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/admin",
        Router::new()
            .route("/keys", get(list_keys))
            .route("/keys/refresh", post(refresh_keys))
            .route("/keys/:label/fail", post(mark_key_failed))
            .route("/select", get(select_key)),
    )
}

/// Liveness plus a per-health count of the cached key statuses.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        keys: KeyHealthSummary::from_selector(&state.selector),
    })
}

/// Returns the status cache snapshot.
pub async fn list_keys(State(state): State<Arc<AppState>>) -> Json<KeysStatusResponse> {
    Json(keys_response(&state, state.selector.status()))
}

/// Forces a live check of every configured key.
pub async fn refresh_keys(State(state): State<Arc<AppState>>) -> Json<KeysStatusResponse> {
    info!("Key status refresh requested via admin API");
    let statuses = state.selector.refresh_all().await;
    Json(keys_response(&state, statuses))
}

/// Marks a key failed. 404 when the key has no status entry yet, 400 when
/// a non-empty body is not a valid request.
pub async fn mark_key_failed(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    body: Bytes,
) -> Result<StatusCode> {
    if !state.selector.status().contains_key(&label) {
        return Err(AppError::NotFound(format!("no status recorded for key '{label}'")));
    }

    // пустое тело допустимо, невалидный JSON нет
    let request: MarkFailedRequest = if body.is_empty() {
        MarkFailedRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let reason = request.reason.as_deref().unwrap_or(DEFAULT_FAILURE_REASON);
    state.selector.mark_failed(&label, reason);
    Ok(StatusCode::NO_CONTENT)
}

/// Runs a selection and reports which key won. The key itself is not returned.
pub async fn select_key(State(state): State<Arc<AppState>>) -> Result<Json<SelectResponse>> {
    let selected = state.selector.select().await?;
    Ok(Json(SelectResponse {
        label: selected.label,
        source: selected.source.as_str().to_string(),
    }))
}

fn keys_response(state: &AppState, keys: BTreeMap<String, KeyStatus>) -> KeysStatusResponse {
    KeysStatusResponse {
        configured: state
            .selector
            .credentials()
            .iter()
            .map(|c| c.label.clone())
            .collect(),
        stale: state.selector.is_stale(),
        keys,
    }
}
