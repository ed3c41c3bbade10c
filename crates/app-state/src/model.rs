//! Timeline entities: shots, tracks, layers, markers, and regions.
//!
//! Field names serialize in camelCase to stay compatible with project files
//! written by the browser editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sq_common::{clamp_unit, is_valid_duration, is_valid_start, new_id, span_end, BlendMode, Frames};

use crate::error::{ModelError, ModelResult};

// ---------------------------------------------------------------------------
// Shots
// ---------------------------------------------------------------------------

/// Progress of the image/video generation job attached to a shot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Pending,
    Running,
    Complete,
    Failed,
}

impl GenerationStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Sampler settings handed to the generation backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Fixed seed, or `None` to let the backend randomize.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Denoising strength (0.0 - 1.0).
    pub denoising: f32,
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub guidance: f32,
    pub sampler: String,
    pub scheduler: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: None,
            denoising: 0.75,
            steps: 30,
            guidance: 7.5,
            sampler: "euler".to_string(),
            scheduler: "normal".to_string(),
        }
    }
}

/// An image used to condition generation for a shot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    pub id: String,
    /// Asset URI or path.
    pub uri: String,
    /// Conditioning weight (0.0 - 1.0).
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ReferenceImage {
    pub fn new(uri: impl Into<String>, weight: f32) -> Self {
        Self {
            id: new_id(),
            uri: uri.into(),
            weight: clamp_unit(weight),
            label: None,
        }
    }
}

/// Record of a visual style preset applied to a shot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualStyleApplication {
    pub style_id: String,
    pub name: String,
    /// Blend strength of the style (0.0 - 1.0).
    pub strength: f32,
    pub applied_at: DateTime<Utc>,
}

/// A timed clip on the primary track, the unit of generation work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub id: String,
    pub name: String,
    /// Start position in frames.
    pub start_time: Frames,
    /// Length in frames (always > 0).
    pub duration: Frames,
    /// Layers stacked within the shot, bottom first.
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub generation: GenerationParams,
    #[serde(default)]
    pub generation_status: GenerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_style: Option<VisualStyleApplication>,
    #[serde(default)]
    pub modified: bool,
}

impl Shot {
    /// Create a shot with a fresh id and default generation settings.
    pub fn new(name: impl Into<String>, start_time: Frames, duration: Frames) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            start_time,
            duration,
            layers: Vec::new(),
            reference_images: Vec::new(),
            prompt: String::new(),
            generation: GenerationParams::default(),
            generation_status: GenerationStatus::Pending,
            visual_style: None,
            modified: false,
        }
    }

    /// Frame at which this shot ends.
    pub fn end_time(&self) -> Frames {
        span_end(self.start_time, self.duration)
    }

    /// Check the timing fields.
    pub fn validate(&self) -> ModelResult<()> {
        if !is_valid_start(self.start_time) {
            return Err(ModelError::InvalidStart {
                id: self.id.clone(),
                value: self.start_time,
            });
        }
        if !is_valid_duration(self.duration) {
            return Err(ModelError::InvalidDuration {
                id: self.id.clone(),
                value: self.duration,
            });
        }
        Ok(())
    }

    pub fn find_layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    pub(crate) fn find_layer_mut(&mut self, layer_id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == layer_id)
    }
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

/// The closed set of lane kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Media,
    Audio,
    Effects,
    Transitions,
    Text,
    Keyframes,
}

impl TrackType {
    /// All track types in their canonical top-to-bottom order.
    pub fn all() -> &'static [TrackType] {
        &[
            Self::Media,
            Self::Audio,
            Self::Effects,
            Self::Transitions,
            Self::Text,
            Self::Keyframes,
        ]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Media => "Media",
            Self::Audio => "Audio",
            Self::Effects => "Effects",
            Self::Transitions => "Transitions",
            Self::Text => "Text",
            Self::Keyframes => "Keyframes",
        }
    }

    fn default_height(self) -> u32 {
        match self {
            Self::Media => 80,
            Self::Audio => 48,
            Self::Keyframes => 32,
            Self::Effects | Self::Transitions | Self::Text => 40,
        }
    }

    fn default_color(self) -> &'static str {
        match self {
            Self::Media => "#3b82f6",
            Self::Audio => "#22c55e",
            Self::Effects => "#a855f7",
            Self::Transitions => "#f59e0b",
            Self::Text => "#ec4899",
            Self::Keyframes => "#64748b",
        }
    }

    fn default_icon(self) -> &'static str {
        match self {
            Self::Media => "film",
            Self::Audio => "music",
            Self::Effects => "sparkles",
            Self::Transitions => "shuffle",
            Self::Text => "type",
            Self::Keyframes => "diamond",
        }
    }
}

/// A horizontal lane on the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Fixed at creation; updates cannot change it.
    #[serde(rename = "type")]
    pub track_type: TrackType,
    /// Display height in pixels.
    pub height: u32,
    pub color: String,
    pub icon: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Track {
    /// Create a track with the type's default name, height, color, and icon.
    pub fn new(track_type: TrackType) -> Self {
        Self {
            id: new_id(),
            name: track_type.display_name().to_string(),
            track_type,
            height: track_type.default_height(),
            color: track_type.default_color().to_string(),
            icon: track_type.default_icon().to_string(),
            locked: false,
            hidden: false,
        }
    }

    pub fn named(track_type: TrackType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new(track_type)
        }
    }
}

/// One track per type, in canonical order. Every new project starts here.
pub fn default_tracks() -> Vec<Track> {
    TrackType::all().iter().copied().map(Track::new).collect()
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// What a layer contributes to its shot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    Image,
    Video,
    Text,
    Shape,
    Adjustment,
}

/// A sub-element stacked within a shot. Owned exclusively by its shot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            locked: false,
            hidden: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Markers and regions
// ---------------------------------------------------------------------------

/// A point-in-time annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub time: Frames,
    pub label: String,
    #[serde(default = "default_marker_color")]
    pub color: String,
    pub updated_at: DateTime<Utc>,
}

fn default_marker_color() -> String {
    "#facc15".to_string()
}

impl Marker {
    pub fn new(time: Frames, label: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            time,
            label: label.into(),
            color: default_marker_color(),
            updated_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !is_valid_start(self.time) {
            return Err(ModelError::InvalidTime {
                kind: "marker",
                id: self.id.clone(),
                value: self.time,
            });
        }
        Ok(())
    }
}

/// A time-range annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub start: Frames,
    pub end: Frames,
    pub label: String,
    #[serde(default = "default_region_color")]
    pub color: String,
    pub updated_at: DateTime<Utc>,
}

fn default_region_color() -> String {
    "#38bdf8".to_string()
}

impl Region {
    pub fn new(start: Frames, end: Frames, label: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            start,
            end,
            label: label.into(),
            color: default_region_color(),
            updated_at: Utc::now(),
        }
    }

    pub fn duration(&self) -> Frames {
        self.end - self.start
    }

    pub fn contains(&self, time: Frames) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn validate(&self) -> ModelResult<()> {
        for value in [self.start, self.end] {
            if !is_valid_start(value) {
                return Err(ModelError::InvalidTime {
                    kind: "region",
                    id: self.id.clone(),
                    value,
                });
            }
        }
        if self.end < self.start {
            return Err(ModelError::InvalidRegion {
                id: self.id.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_end_time() {
        let shot = Shot::new("Opening", 12.0, 48.0);
        assert!((shot.end_time() - 60.0).abs() < f64::EPSILON);
        assert_eq!(shot.generation_status, GenerationStatus::Pending);
        assert!(!shot.modified);
    }

    #[test]
    fn shot_validation() {
        assert!(Shot::new("ok", 0.0, 1.0).validate().is_ok());

        let err = Shot::new("neg", -1.0, 10.0).validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidStart { .. }));

        let err = Shot::new("zero", 0.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidDuration { .. }));
    }

    #[test]
    fn default_track_set_covers_every_type() {
        let tracks = default_tracks();
        assert_eq!(tracks.len(), TrackType::all().len());
        for (track, ty) in tracks.iter().zip(TrackType::all()) {
            assert_eq!(track.track_type, *ty);
            assert!(!track.locked);
            assert!(!track.hidden);
        }
    }

    #[test]
    fn track_type_serializes_under_type_key() {
        let track = Track::named(TrackType::Audio, "Dialogue");
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["type"], "audio");
        assert_eq!(json["name"], "Dialogue");
    }

    #[test]
    fn shot_serializes_camel_case() {
        let shot = Shot::new("A", 0.0, 24.0);
        let json = serde_json::to_value(&shot).unwrap();
        assert!(json.get("startTime").is_some());
        assert_eq!(json["generationStatus"], "pending");
        assert!(json.get("visualStyle").is_none());
    }

    #[test]
    fn shot_deserializes_with_minimal_fields() {
        let json = r#"{ "id": "s1", "name": "Minimal", "startTime": 0, "duration": 10 }"#;
        let shot: Shot = serde_json::from_str(json).unwrap();
        assert!(shot.layers.is_empty());
        assert_eq!(shot.generation, GenerationParams::default());
    }

    #[test]
    fn region_validation() {
        assert!(Region::new(10.0, 20.0, "Act 1").validate().is_ok());
        let err = Region::new(20.0, 10.0, "Backwards").validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidRegion { .. }));
        assert!(Region::new(-5.0, 10.0, "Neg").validate().is_err());
    }

    #[test]
    fn reference_image_weight_clamped() {
        assert_eq!(ReferenceImage::new("a.png", 3.0).weight, 1.0);
    }

    #[test]
    fn generation_status_terminal_states() {
        assert!(GenerationStatus::Complete.is_finished());
        assert!(GenerationStatus::Failed.is_finished());
        assert!(!GenerationStatus::Running.is_finished());
    }
}
