// src/selection/mod.rs

pub mod health_check;
pub mod key_rotation;

pub use health_check::{parse_key_info, OpenRouterProbe, ProbeOutcome, StatusProbe};
pub use key_rotation::{rotate_from, RoundRobinRotation};
