//! Partial-update payloads, one per entity type.
//!
//! Every field is optional; `None` leaves the current value untouched. Unknown
//! keys are rejected at deserialization so a typo in a gesture-layer payload
//! surfaces as an error instead of a silently ignored edit.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sq_common::{clamp_unit, is_valid_duration, is_valid_start, BlendMode, Frames};

use crate::error::{ModelError, ModelResult};
use crate::model::{
    GenerationParams, GenerationStatus, Layer, Marker, ReferenceImage, Region, Shot, Track,
    VisualStyleApplication,
};

/// Partial update for a [`Shot`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShotUpdate {
    pub name: Option<String>,
    pub start_time: Option<Frames>,
    pub duration: Option<Frames>,
    pub prompt: Option<String>,
    pub reference_images: Option<Vec<ReferenceImage>>,
    pub generation: Option<GenerationParams>,
    pub generation_status: Option<GenerationStatus>,
    pub visual_style: Option<VisualStyleApplication>,
    /// Remove the applied visual style. Wins over `visual_style`.
    #[serde(default)]
    pub clear_visual_style: bool,
    /// Explicit value for the `modified` flag. When absent the shot is
    /// marked modified.
    pub modified: Option<bool>,
}

impl ShotUpdate {
    /// Check the timing fields that are present.
    pub fn validate(&self, id: &str) -> ModelResult<()> {
        if let Some(start) = self.start_time {
            if !is_valid_start(start) {
                return Err(ModelError::InvalidStart {
                    id: id.to_string(),
                    value: start,
                });
            }
        }
        if let Some(duration) = self.duration {
            if !is_valid_duration(duration) {
                return Err(ModelError::InvalidDuration {
                    id: id.to_string(),
                    value: duration,
                });
            }
        }
        if let Some(params) = &self.generation {
            if !params.denoising.is_finite() || !params.guidance.is_finite() {
                return Err(ModelError::NonFinite {
                    id: id.to_string(),
                    field: "generation",
                });
            }
        }
        Ok(())
    }

    /// Whether applying this update can move the shot's end frame.
    pub fn touches_timing(&self) -> bool {
        self.start_time.is_some() || self.duration.is_some()
    }

    pub(crate) fn apply(self, shot: &mut Shot) {
        if let Some(name) = self.name {
            shot.name = name;
        }
        if let Some(start) = self.start_time {
            shot.start_time = start;
        }
        if let Some(duration) = self.duration {
            shot.duration = duration;
        }
        if let Some(prompt) = self.prompt {
            shot.prompt = prompt;
        }
        if let Some(images) = self.reference_images {
            shot.reference_images = images;
        }
        if let Some(generation) = self.generation {
            shot.generation = generation;
        }
        if let Some(status) = self.generation_status {
            shot.generation_status = status;
        }
        if self.clear_visual_style {
            shot.visual_style = None;
        } else if let Some(style) = self.visual_style {
            shot.visual_style = Some(style);
        }
        shot.modified = self.modified.unwrap_or(true);
    }
}

/// Partial update for a [`Track`]. The track type is fixed and has no field here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackUpdate {
    pub name: Option<String>,
    pub height: Option<u32>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
}

impl TrackUpdate {
    pub(crate) fn apply(self, track: &mut Track) {
        if let Some(name) = self.name {
            track.name = name;
        }
        if let Some(height) = self.height {
            track.height = height;
        }
        if let Some(color) = self.color {
            track.color = color;
        }
        if let Some(icon) = self.icon {
            track.icon = icon;
        }
        if let Some(locked) = self.locked {
            track.locked = locked;
        }
        if let Some(hidden) = self.hidden {
            track.hidden = hidden;
        }
    }
}

/// Partial update for a [`Layer`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayerUpdate {
    pub name: Option<String>,
    /// Clamped to `[0, 1]` on apply.
    pub opacity: Option<f32>,
    pub blend_mode: Option<BlendMode>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
}

impl LayerUpdate {
    pub(crate) fn apply(self, layer: &mut Layer) {
        if let Some(name) = self.name {
            layer.name = name;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = clamp_unit(opacity);
        }
        if let Some(mode) = self.blend_mode {
            layer.blend_mode = mode;
        }
        if let Some(locked) = self.locked {
            layer.locked = locked;
        }
        if let Some(hidden) = self.hidden {
            layer.hidden = hidden;
        }
    }
}

/// Partial update for a [`Marker`]. Applying always refreshes `updated_at`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkerUpdate {
    pub time: Option<Frames>,
    pub label: Option<String>,
    pub color: Option<String>,
}

impl MarkerUpdate {
    pub fn validate(&self, id: &str) -> ModelResult<()> {
        match self.time {
            Some(time) if !is_valid_start(time) => Err(ModelError::InvalidTime {
                kind: "marker",
                id: id.to_string(),
                value: time,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn apply(self, marker: &mut Marker) {
        if let Some(time) = self.time {
            marker.time = time;
        }
        if let Some(label) = self.label {
            marker.label = label;
        }
        if let Some(color) = self.color {
            marker.color = color;
        }
        marker.updated_at = Utc::now();
    }
}

/// Partial update for a [`Region`]. Applying always refreshes `updated_at`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegionUpdate {
    pub start: Option<Frames>,
    pub end: Option<Frames>,
    pub label: Option<String>,
    pub color: Option<String>,
}

impl RegionUpdate {
    /// Validate against the region being edited, so a start-only update that
    /// would cross the existing end is caught too.
    pub fn validate(&self, region: &Region) -> ModelResult<()> {
        let start = self.start.unwrap_or(region.start);
        let end = self.end.unwrap_or(region.end);
        for value in [start, end] {
            if !is_valid_start(value) {
                return Err(ModelError::InvalidTime {
                    kind: "region",
                    id: region.id.clone(),
                    value,
                });
            }
        }
        if end < start {
            return Err(ModelError::InvalidRegion {
                id: region.id.clone(),
                start,
                end,
            });
        }
        Ok(())
    }

    pub(crate) fn apply(self, region: &mut Region) {
        if let Some(start) = self.start {
            region.start = start;
        }
        if let Some(end) = self.end {
            region.end = end;
        }
        if let Some(label) = self.label {
            region.label = label;
        }
        if let Some(color) = self.color {
            region.color = color;
        }
        region.updated_at = Utc::now();
    }
}
