//! Core scalar helpers shared by the timeline model.
//!
//! Timeline positions are expressed in frame units as `f64`. Plain floats are
//! used instead of newtypes so that project files written by other editors
//! (which store numbers, not tagged values) deserialize without adapters.

use uuid::Uuid;

/// Position or length on the timeline, in frames.
pub type Frames = f64;

/// Generate a fresh entity id (UUID v4, hyphenated).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// End of a span that starts at `start` and lasts `duration` frames.
pub fn span_end(start: Frames, duration: Frames) -> Frames {
    start + duration
}

/// A start position is valid when it is finite and non-negative.
pub fn is_valid_start(start: Frames) -> bool {
    start.is_finite() && start >= 0.0
}

/// A duration is valid when it is finite and strictly positive.
pub fn is_valid_duration(duration: Frames) -> bool {
    duration.is_finite() && duration > 0.0
}

/// Clamp a normalized value (opacity, strength) into `[0, 1]`.
///
/// NaN collapses to `0.0` so a corrupt value can never propagate.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
