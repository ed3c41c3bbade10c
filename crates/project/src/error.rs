//! Error types for the project crate (thiserror-based).

use sq_app_state::ModelError;
use thiserror::Error;

/// Errors that can occur during project file and recovery operations.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// File I/O error (read, write, path resolution).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while writing.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not a well-formed project file.
    #[error("Invalid project file: {0}")]
    Format(String),

    /// A required version tag is absent.
    #[error("Project file has no `{field}` field")]
    MissingVersion { field: &'static str },

    /// The schema version is not one this build reads.
    #[error("Unsupported schema version {found:?} (expected {expected:?})")]
    UnsupportedSchema { found: String, expected: String },

    /// Compatibility check failed; nothing was applied.
    #[error("Project is incompatible: {}", .errors.join("; "))]
    Incompatible { errors: Vec<String> },

    /// The project file path does not exist or is not a file.
    #[error("Project file not found: {path}")]
    NotFound { path: String },

    /// The recovery storage medium rejected a read or write.
    #[error("Recovery storage error: {reason}")]
    Storage { reason: String },

    /// An entity or update payload failed validation.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Convenience Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
