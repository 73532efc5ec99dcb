// src/storage/mod.rs

pub mod key_status;
pub mod memory;

pub use key_status::{KeyHealth, KeyStatus};
pub use memory::StatusCache;
