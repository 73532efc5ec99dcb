// src/monitoring/mod.rs

pub mod key_health;

pub use key_health::{refresh_if_stale, spawn_refresh_task, KeyHealthSummary};
