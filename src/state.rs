// src/state.rs

use crate::config::AppConfig;
use crate::error::Result;
use crate::key_manager::KeySelector;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared state for the Axum handlers.
#[derive(Debug)]
pub struct AppState {
    pub selector: Arc<KeySelector>,
    pub config: AppConfig,
    pub start_time: Instant,
}

impl AppState {
    /// Builds the selector (and its HTTP client) from `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Creating shared AppState: initializing key selector...");
        let selector = Arc::new(KeySelector::from_config(&config)?);
        Ok(Self::with_selector(config, selector))
    }

    pub fn with_selector(config: AppConfig, selector: Arc<KeySelector>) -> Self {
        Self {
            selector,
            config,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
