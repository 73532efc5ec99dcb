// src/lib.rs

// --- Модули ---
pub mod admin;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod key_manager;
pub mod metrics;
pub mod monitoring;
pub mod selection;
pub mod state;
pub mod storage;

// --- Зависимости и пере-экспорты ---
use axum::{
    body::Body,
    http::{HeaderValue, Request as AxumRequest},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::{path::Path, sync::Arc, time::Instant};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub use config::{AppConfig, Credential};
pub use error::{AppError, Result};
pub use handlers::{call_with_rotation, RotationError};
pub use key_manager::{KeySelector, SelectedKey, SelectionSource};
pub use state::AppState;

/// Создает основной роутер Axum для приложения.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(admin::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .merge(admin::admin_routes())
        .layer(axum::middleware::from_fn(trace_requests))
        .with_state(state)
}

/// Middleware для добавления Request ID и трассировки запросов.
async fn trace_requests(mut req: AxumRequest<Body>, next: axum::middleware::Next) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        http.method = %method,
        url.path = %path,
    );

    req.extensions_mut().insert(request_id);

    async move {
        let mut response = next.run(req).await;
        let elapsed = start_time.elapsed();

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("X-Request-ID", value);
        }

        info!(
            http.response.duration = ?elapsed,
            http.status_code = response.status().as_u16(),
            "Finished processing request"
        );

        response
    }
    .instrument(span)
    .await
}

/// Загружает конфигурацию, создает состояние и роутер.
///
/// Starts the background refresh task when `provider.refresh_interval_secs`
/// is set.
pub async fn run(config_path: &Path) -> Result<(Router, Arc<AppState>)> {
    info!("Starting OpenRouter key selector...");

    let app_config = setup_configuration(config_path)?;
    let state = Arc::new(AppState::new(app_config)?);

    if let Some(secs) = state.config.provider.refresh_interval_secs {
        monitoring::spawn_refresh_task(
            state.selector.clone(),
            std::time::Duration::from_secs(secs),
        );
    }

    Ok((create_router(state.clone()), state))
}

/// Загружает, валидирует и логирует конфигурацию приложения.
pub fn setup_configuration(config_path: &Path) -> Result<AppConfig> {
    let config_path_display = config_path.display().to_string();
    if config_path.exists() {
        info!(config.path = %config_path_display, "Using configuration file");
    } else {
        info!(config.path = %config_path_display, "Optional configuration file not found. Using defaults and environment variables.");
    }

    let app_config = config::load_config(config_path).map_err(|e| {
        error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration."
        );
        e
    })?;

    info!(
        config.credentials = ?app_config.credential_labels(),
        config.cache_ttl_secs = app_config.provider.cache_ttl_secs,
        server.port = app_config.server.port,
        "Configuration loaded and validated successfully."
    );

    Ok(app_config)
}
