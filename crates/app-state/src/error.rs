//! Boundary validation errors for timeline entities and update payloads.
//!
//! Store mutations never return these: a missing id is a silent no-op. They
//! are raised where untrusted data enters the model (deserialization,
//! gesture-layer payloads, reorder requests).

use thiserror::Error;

/// Errors raised when an entity or update payload has an invalid shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("shot {id}: start time must be finite and non-negative, got {value}")]
    InvalidStart { id: String, value: f64 },

    #[error("shot {id}: duration must be finite and positive, got {value}")]
    InvalidDuration { id: String, value: f64 },

    #[error("{kind} {id}: time must be finite and non-negative, got {value}")]
    InvalidTime {
        kind: &'static str,
        id: String,
        value: f64,
    },

    #[error("region {id}: end {end} is before start {start}")]
    InvalidRegion { id: String, start: f64, end: f64 },

    #[error("shot {id}: {field} must be finite")]
    NonFinite { id: String, field: &'static str },

    #[error("{what} reorder rejected: {reason}")]
    IncompleteOrder { what: &'static str, reason: String },

    #[error("duplicate {what} id: {id}")]
    DuplicateId { what: &'static str, id: String },
}

/// Convenience Result type for model validation.
pub type ModelResult<T> = Result<T, ModelError>;
