//! Configuration errors (thiserror-based).

use thiserror::Error;

/// Errors raised while reading or validating an [`EditorConfig`](crate::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Convenience Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
