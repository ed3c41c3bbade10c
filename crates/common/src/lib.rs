//! `sq-common` -- Shared types and configuration for the sequence editor core.
//!
//! This crate is the foundation the state and persistence crates depend on:
//!
//! - **Types**: id generation and frame-unit helpers (`new_id`, `span_end`, `clamp_unit`)
//! - **Blend**: `BlendMode` for layer compositing metadata
//! - **Config**: `EditorConfig`, `HistoryConfig`, `RecoveryConfig` (tunable limits)
//! - **Errors**: `ConfigError` (thiserror-based)

pub mod blend;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use blend::BlendMode;
pub use config::{
    EditorConfig, HistoryConfig, RecoveryConfig, DEFAULT_HISTORY_DEPTH,
    DEFAULT_RECOVERY_INTERVAL_SECS, DEFAULT_RECOVERY_SNAPSHOTS,
};
pub use error::{ConfigError, ConfigResult};
pub use types::{clamp_unit, is_valid_duration, is_valid_start, new_id, span_end, Frames};
