// src/handlers/mod.rs

pub mod rotation;

pub use rotation::{call_with_rotation, RotationError};
