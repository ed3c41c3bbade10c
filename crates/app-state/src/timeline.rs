//! The timeline store: shots, tracks, layers, markers, regions, playhead,
//! zoom, and selection.
//!
//! Every mutation is total. Operations addressed at an id that does not exist
//! return without effect (`false` / `None`) instead of failing, so stale UI
//! callbacks can call them without checking first.
//!
//! `duration` is derived: it always equals the largest shot end frame (or 0)
//! and is recomputed after every shot add, update, delete, and reorder. It is
//! never taken from serialized input.
//!
//! Lock flags on tracks and layers are *not* enforced here. Undo and crash
//! recovery restore must be able to write through locks, so blocking edits on
//! locked elements belongs to the gesture layer.

use serde::{Deserialize, Serialize};
use sq_common::{clamp_unit, BlendMode, Frames};

use crate::error::{ModelError, ModelResult};
use crate::model::{default_tracks, Layer, Marker, Region, Shot, Track};
use crate::selection::{Modifiers, SelectionState};
use crate::update::{LayerUpdate, MarkerUpdate, RegionUpdate, ShotUpdate, TrackUpdate};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Canonical timeline state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TimelineRecord")]
pub struct TimelineState {
    shots: Vec<Shot>,
    tracks: Vec<Track>,
    markers: Vec<Marker>,
    regions: Vec<Region>,
    /// Derived: max shot end frame.
    duration: Frames,
    playhead_position: Frames,
    zoom_level: f64,
    selection: SelectionState,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineState {
    /// An empty timeline with the default track set.
    pub fn new() -> Self {
        Self {
            shots: Vec::new(),
            tracks: default_tracks(),
            markers: Vec::new(),
            regions: Vec::new(),
            duration: 0.0,
            playhead_position: 0.0,
            zoom_level: 1.0,
            selection: SelectionState::new(),
        }
    }

    // --- read access ---

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Timeline length in frames (max shot end, 0 when empty).
    pub fn duration(&self) -> Frames {
        self.duration
    }

    pub fn playhead_position(&self) -> Frames {
        self.playhead_position
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn find_shot(&self, id: &str) -> Option<&Shot> {
        self.shots.iter().find(|s| s.id == id)
    }

    pub fn find_track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn find_layer(&self, shot_id: &str, layer_id: &str) -> Option<&Layer> {
        self.find_shot(shot_id)?.find_layer(layer_id)
    }

    pub fn find_marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn find_region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    fn find_shot_mut(&mut self, id: &str) -> Option<&mut Shot> {
        self.shots.iter_mut().find(|s| s.id == id)
    }

    fn find_track_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    fn recompute_duration(&mut self) {
        self.duration = self
            .shots
            .iter()
            .map(Shot::end_time)
            .fold(0.0_f64, f64::max);
    }

    // --- shots ---

    /// Append a shot and extend the duration if it ends later.
    pub fn add_shot(&mut self, shot: Shot) {
        tracing::debug!(shot_id = %shot.id, start = shot.start_time, duration = shot.duration, "Adding shot");
        self.duration = self.duration.max(shot.end_time());
        self.shots.push(shot);
    }

    /// Merge `update` into the shot. Duration is recomputed over all shots,
    /// since shortening one shot may lower the bound.
    pub fn update_shot(&mut self, id: &str, update: ShotUpdate) -> bool {
        let Some(shot) = self.find_shot_mut(id) else {
            tracing::warn!(shot_id = id, "update_shot: no such shot");
            return false;
        };
        let timing = update.touches_timing();
        update.apply(shot);
        if timing {
            self.recompute_duration();
        }
        tracing::debug!(shot_id = id, duration = self.duration, "Updated shot");
        true
    }

    /// Remove a shot and drop its id from the selection.
    pub fn delete_shot(&mut self, id: &str) -> Option<Shot> {
        let pos = self.shots.iter().position(|s| s.id == id)?;
        let shot = self.shots.remove(pos);
        self.selection.forget(id);
        for layer in &shot.layers {
            self.selection.forget(&layer.id);
        }
        self.recompute_duration();
        tracing::debug!(shot_id = id, remaining = self.shots.len(), "Deleted shot");
        Some(shot)
    }

    /// Replace the shot list with a new ordering.
    ///
    /// Callers must pass the complete list; see [`validate_shot_order`](Self::validate_shot_order).
    pub fn reorder_shots(&mut self, ordered: Vec<Shot>) {
        self.shots = ordered;
        self.recompute_duration();
        tracing::debug!(count = self.shots.len(), "Reordered shots");
    }

    /// Check that `ordered` is a permutation of the current shot ids.
    pub fn validate_shot_order(&self, ordered: &[Shot]) -> ModelResult<()> {
        check_permutation(
            "shot",
            self.shots.iter().map(|s| s.id.as_str()),
            ordered.iter().map(|s| s.id.as_str()),
        )
    }

    // --- tracks ---

    pub fn add_track(&mut self, track: Track) {
        tracing::debug!(track_id = %track.id, track_type = ?track.track_type, "Adding track");
        self.tracks.push(track);
    }

    pub fn update_track(&mut self, id: &str, update: TrackUpdate) -> bool {
        let Some(track) = self.find_track_mut(id) else {
            tracing::warn!(track_id = id, "update_track: no such track");
            return false;
        };
        update.apply(track);
        true
    }

    pub fn delete_track(&mut self, id: &str) -> Option<Track> {
        let pos = self.tracks.iter().position(|t| t.id == id)?;
        tracing::debug!(track_id = id, "Deleted track");
        Some(self.tracks.remove(pos))
    }

    /// Replace the track list wholesale.
    ///
    /// Partial lists are a caller bug; check with
    /// [`validate_track_order`](Self::validate_track_order) first.
    pub fn reorder_tracks(&mut self, ordered: Vec<Track>) {
        self.tracks = ordered;
        tracing::debug!(count = self.tracks.len(), "Reordered tracks");
    }

    /// Check that `ordered` is a permutation of the current track ids.
    pub fn validate_track_order(&self, ordered: &[Track]) -> ModelResult<()> {
        check_permutation(
            "track",
            self.tracks.iter().map(|t| t.id.as_str()),
            ordered.iter().map(|t| t.id.as_str()),
        )
    }

    /// Flip the lock flag. Returns the new value.
    pub fn toggle_track_lock(&mut self, id: &str) -> Option<bool> {
        let track = self.find_track_mut(id)?;
        track.locked = !track.locked;
        Some(track.locked)
    }

    /// Flip the hidden flag. Returns the new value.
    pub fn toggle_track_hidden(&mut self, id: &str) -> Option<bool> {
        let track = self.find_track_mut(id)?;
        track.hidden = !track.hidden;
        Some(track.hidden)
    }

    // --- layers (scoped by shot) ---

    /// Append a layer to a shot. Opacity is clamped to `[0, 1]`.
    pub fn add_layer(&mut self, shot_id: &str, mut layer: Layer) -> bool {
        let Some(shot) = self.find_shot_mut(shot_id) else {
            tracing::warn!(shot_id, "add_layer: no such shot");
            return false;
        };
        tracing::debug!(shot_id, layer_id = %layer.id, "Adding layer");
        layer.opacity = clamp_unit(layer.opacity);
        shot.layers.push(layer);
        shot.modified = true;
        true
    }

    pub fn update_layer(&mut self, shot_id: &str, layer_id: &str, update: LayerUpdate) -> bool {
        self.with_layer(shot_id, layer_id, |layer| update.apply(layer))
            .is_some()
    }

    pub fn delete_layer(&mut self, shot_id: &str, layer_id: &str) -> Option<Layer> {
        let shot = self.find_shot_mut(shot_id)?;
        let pos = shot.layers.iter().position(|l| l.id == layer_id)?;
        let layer = shot.layers.remove(pos);
        shot.modified = true;
        self.selection.forget(layer_id);
        tracing::debug!(shot_id, layer_id, "Deleted layer");
        Some(layer)
    }

    /// Replace a shot's layer stack. Returns `false` if the shot is missing.
    pub fn reorder_layers(&mut self, shot_id: &str, ordered: Vec<Layer>) -> bool {
        let Some(shot) = self.find_shot_mut(shot_id) else {
            return false;
        };
        shot.layers = ordered;
        shot.modified = true;
        true
    }

    pub fn toggle_layer_lock(&mut self, shot_id: &str, layer_id: &str) -> Option<bool> {
        self.with_layer(shot_id, layer_id, |layer| {
            layer.locked = !layer.locked;
            layer.locked
        })
    }

    pub fn toggle_layer_hidden(&mut self, shot_id: &str, layer_id: &str) -> Option<bool> {
        self.with_layer(shot_id, layer_id, |layer| {
            layer.hidden = !layer.hidden;
            layer.hidden
        })
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_layer_opacity(&mut self, shot_id: &str, layer_id: &str, opacity: f32) -> bool {
        self.with_layer(shot_id, layer_id, |layer| layer.opacity = clamp_unit(opacity))
            .is_some()
    }

    pub fn set_layer_blend_mode(&mut self, shot_id: &str, layer_id: &str, mode: BlendMode) -> bool {
        self.with_layer(shot_id, layer_id, |layer| layer.blend_mode = mode)
            .is_some()
    }

    fn with_layer<R>(
        &mut self,
        shot_id: &str,
        layer_id: &str,
        f: impl FnOnce(&mut Layer) -> R,
    ) -> Option<R> {
        let shot = self.find_shot_mut(shot_id)?;
        let layer = shot.find_layer_mut(layer_id)?;
        let result = f(layer);
        shot.modified = true;
        Some(result)
    }

    // --- markers ---

    pub fn add_marker(&mut self, marker: Marker) {
        tracing::debug!(marker_id = %marker.id, time = marker.time, "Adding marker");
        self.markers.push(marker);
    }

    /// Merge `update` and refresh `updated_at`.
    pub fn update_marker(&mut self, id: &str, update: MarkerUpdate) -> bool {
        let Some(marker) = self.markers.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        update.apply(marker);
        true
    }

    pub fn delete_marker(&mut self, id: &str) -> Option<Marker> {
        let pos = self.markers.iter().position(|m| m.id == id)?;
        self.selection.forget_marker(id);
        Some(self.markers.remove(pos))
    }

    // --- regions ---

    pub fn add_region(&mut self, region: Region) {
        tracing::debug!(region_id = %region.id, start = region.start, end = region.end, "Adding region");
        self.regions.push(region);
    }

    /// Merge `update` and refresh `updated_at`.
    pub fn update_region(&mut self, id: &str, update: RegionUpdate) -> bool {
        let Some(region) = self.regions.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        update.apply(region);
        true
    }

    pub fn delete_region(&mut self, id: &str) -> Option<Region> {
        let pos = self.regions.iter().position(|r| r.id == id)?;
        self.selection.forget_region(id);
        Some(self.regions.remove(pos))
    }

    // --- playhead and zoom ---

    /// Move the playhead. Negative or non-finite positions clamp to 0.
    pub fn set_playhead(&mut self, position: Frames) {
        self.playhead_position = if position.is_finite() {
            position.max(0.0)
        } else {
            0.0
        };
    }

    /// Set zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, level: f64) {
        if level.is_finite() {
            self.zoom_level = level.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    // --- selection ---

    pub fn select_one(&mut self, id: &str, additive: bool) {
        self.selection.select_one(id, additive);
    }

    pub fn toggle_selection(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    pub fn select_range(&mut self, anchor_id: &str, target_id: &str) {
        self.selection.select_range(&self.shots, anchor_id, target_id);
    }

    /// Resolve a click on `id` under the given modifiers.
    pub fn click(&mut self, id: &str, modifiers: Modifiers) {
        self.selection.handle_click(&self.shots, id, modifiers);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.shots);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selected_shots(&self) -> Vec<&Shot> {
        self.selection.selected_items(&self.shots)
    }

    pub fn select_marker(&mut self, id: &str, additive: bool) {
        self.selection.select_marker(id, additive);
    }

    pub fn select_region(&mut self, id: &str, additive: bool) {
        self.selection.select_region(id, additive);
    }
}

/// Check that `proposed` names every id of `current` exactly once.
fn check_permutation<'a>(
    what: &'static str,
    current: impl Iterator<Item = &'a str>,
    proposed: impl Iterator<Item = &'a str>,
) -> ModelResult<()> {
    let mut remaining: std::collections::HashSet<&str> = current.collect();
    let expected = remaining.len();
    let mut seen = 0usize;
    for id in proposed {
        seen += 1;
        if !remaining.remove(id) {
            return Err(ModelError::IncompleteOrder {
                what,
                reason: format!("unknown or repeated id {id}"),
            });
        }
    }
    if !remaining.is_empty() {
        return Err(ModelError::IncompleteOrder {
            what,
            reason: format!("{} of {expected} ids missing (got {seen})", remaining.len()),
        });
    }
    Ok(())
}

/// Wire form of [`TimelineState`]. Deserialization goes through this so that
/// entity shapes are validated and `duration` is derived, not trusted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineRecord {
    #[serde(default)]
    shots: Vec<Shot>,
    #[serde(default = "default_tracks")]
    tracks: Vec<Track>,
    #[serde(default)]
    markers: Vec<Marker>,
    #[serde(default)]
    regions: Vec<Region>,
    #[serde(default)]
    playhead_position: Frames,
    #[serde(default = "default_zoom")]
    zoom_level: f64,
    #[serde(default)]
    selection: SelectionState,
}

fn default_zoom() -> f64 {
    1.0
}

impl TryFrom<TimelineRecord> for TimelineState {
    type Error = ModelError;

    fn try_from(record: TimelineRecord) -> Result<Self, Self::Error> {
        let mut ids = std::collections::HashSet::new();
        for shot in &record.shots {
            shot.validate()?;
            if !ids.insert(shot.id.as_str()) {
                return Err(ModelError::DuplicateId {
                    what: "shot",
                    id: shot.id.clone(),
                });
            }
        }
        for marker in &record.markers {
            marker.validate()?;
        }
        for region in &record.regions {
            region.validate()?;
        }

        let mut selection = record.selection;
        selection.dedup();

        let mut state = Self {
            shots: record.shots,
            tracks: record.tracks,
            markers: record.markers,
            regions: record.regions,
            duration: 0.0,
            playhead_position: 0.0,
            zoom_level: 1.0,
            selection,
        };
        state.recompute_duration();
        state.set_playhead(record.playhead_position);
        state.set_zoom(record.zoom_level);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayerKind, TrackType};
    use proptest::prelude::*;

    fn shot(id: &str, start: f64, duration: f64) -> Shot {
        let mut shot = Shot::new(id, start, duration);
        shot.id = id.to_string();
        shot
    }

    fn expected_duration(state: &TimelineState) -> f64 {
        state.shots().iter().map(|s| s.end_time()).fold(0.0, f64::max)
    }

    #[test]
    fn new_timeline_has_default_tracks() {
        let state = TimelineState::new();
        assert!(state.shots().is_empty());
        assert_eq!(state.tracks().len(), TrackType::all().len());
        assert_eq!(state.duration(), 0.0);
        assert_eq!(state.zoom_level(), 1.0);
    }

    #[test]
    fn add_shot_extends_duration() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 24.0));
        assert_eq!(state.duration(), 24.0);
        state.add_shot(shot("b", 100.0, 10.0));
        assert_eq!(state.duration(), 110.0);
        state.add_shot(shot("c", 5.0, 5.0));
        assert_eq!(state.duration(), 110.0);
    }

    #[test]
    fn update_shot_can_lower_duration() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 24.0));
        state.add_shot(shot("b", 24.0, 100.0));
        assert_eq!(state.duration(), 124.0);

        let applied = state.update_shot(
            "b",
            ShotUpdate {
                duration: Some(6.0),
                ..Default::default()
            },
        );
        assert!(applied);
        assert_eq!(state.duration(), 30.0);
        assert!(state.find_shot("b").unwrap().modified);
    }

    #[test]
    fn update_missing_shot_is_noop() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 24.0));
        let before = state.clone();
        assert!(!state.update_shot("zzz", ShotUpdate::default()));
        assert_eq!(state, before);
    }

    #[test]
    fn delete_shot_prunes_selection_and_is_idempotent() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 24.0));
        state.add_shot(shot("b", 24.0, 24.0));
        state.select_one("a", false);
        state.select_one("b", true);

        assert!(state.delete_shot("b").is_some());
        assert!(!state.is_selected("b"));
        assert!(state.is_selected("a"));
        assert_eq!(state.duration(), 24.0);

        assert!(state.delete_shot("b").is_none());
        assert!(state.delete_shot("a").is_some());
        assert_eq!(state.duration(), 0.0);
        assert!(state.selection().selected_ids().is_empty());
    }

    #[test]
    fn delete_shot_prunes_its_layers_from_selection() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 24.0));
        let layer = Layer::new("Overlay", LayerKind::Image);
        let layer_id = layer.id.clone();
        state.add_layer("a", layer);
        state.select_one(&layer_id, false);

        state.delete_shot("a");
        assert!(!state.is_selected(&layer_id));
    }

    #[test]
    fn reorder_shots_keeps_duration_and_selection_by_id() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 10.0));
        state.add_shot(shot("b", 10.0, 10.0));
        state.add_shot(shot("c", 20.0, 10.0));
        state.select_range("a", "b");

        let mut ordered = state.shots().to_vec();
        ordered.reverse();
        state.validate_shot_order(&ordered).unwrap();
        state.reorder_shots(ordered);

        assert_eq!(state.shots()[0].id, "c");
        assert_eq!(state.duration(), 30.0);
        assert!(state.is_selected("a"));
        assert!(state.is_selected("b"));
        assert!(!state.is_selected("c"));
    }

    #[test]
    fn track_reorder_validation_rejects_partial_lists() {
        let state = TimelineState::new();
        let mut partial = state.tracks().to_vec();
        partial.pop();
        let err = state.validate_track_order(&partial).unwrap_err();
        assert!(matches!(err, ModelError::IncompleteOrder { what: "track", .. }));

        let mut dup = state.tracks().to_vec();
        let first = dup[0].clone();
        dup[1] = first;
        assert!(state.validate_track_order(&dup).is_err());

        let mut full = state.tracks().to_vec();
        full.reverse();
        assert!(state.validate_track_order(&full).is_ok());
    }

    #[test]
    fn reorder_tracks_replaces_list() {
        let mut state = TimelineState::new();
        let mut ordered = state.tracks().to_vec();
        ordered.reverse();
        let first_id = ordered[0].id.clone();
        state.reorder_tracks(ordered);
        assert_eq!(state.tracks()[0].id, first_id);
        assert_eq!(state.duration(), 0.0);
    }

    #[test]
    fn track_crud_and_toggles() {
        let mut state = TimelineState::new();
        let track = Track::named(TrackType::Text, "Subtitles");
        let id = track.id.clone();
        state.add_track(track);

        assert!(state.update_track(
            &id,
            TrackUpdate {
                color: Some("#fff".into()),
                ..Default::default()
            }
        ));
        assert_eq!(state.find_track(&id).unwrap().color, "#fff");

        assert_eq!(state.toggle_track_lock(&id), Some(true));
        assert_eq!(state.toggle_track_lock(&id), Some(false));
        assert_eq!(state.toggle_track_hidden(&id), Some(true));
        assert_eq!(state.toggle_track_lock("missing"), None);

        assert!(state.delete_track(&id).is_some());
        assert!(state.delete_track(&id).is_none());
        assert!(!state.update_track(&id, TrackUpdate::default()));
    }

    #[test]
    fn locked_track_does_not_block_store_mutation() {
        let mut state = TimelineState::new();
        let media_id = state.tracks()[0].id.clone();
        state.toggle_track_lock(&media_id);
        state.add_shot(shot("a", 0.0, 10.0));
        assert!(state.update_shot(
            "a",
            ShotUpdate {
                name: Some("edited".into()),
                ..Default::default()
            }
        ));
        assert_eq!(state.find_shot("a").unwrap().name, "edited");
    }

    #[test]
    fn added_layer_opacity_is_clamped() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 10.0));
        let mut layer = Layer::new("Haze", LayerKind::Adjustment);
        layer.opacity = 3.0;
        let lid = layer.id.clone();
        assert!(state.add_layer("a", layer));
        assert_eq!(state.find_layer("a", &lid).unwrap().opacity, 1.0);
    }

    #[test]
    fn layer_operations_scoped_by_shot() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 10.0));
        let layer = Layer::new("Sky", LayerKind::Image);
        let lid = layer.id.clone();

        assert!(!state.add_layer("missing", layer.clone()));
        assert!(state.add_layer("a", layer));

        assert!(state.set_layer_opacity("a", &lid, 2.5));
        assert_eq!(state.find_layer("a", &lid).unwrap().opacity, 1.0);
        assert!(state.set_layer_opacity("a", &lid, -1.0));
        assert_eq!(state.find_layer("a", &lid).unwrap().opacity, 0.0);

        assert!(state.set_layer_blend_mode("a", &lid, BlendMode::Multiply));
        assert_eq!(
            state.find_layer("a", &lid).unwrap().blend_mode,
            BlendMode::Multiply
        );

        assert_eq!(state.toggle_layer_lock("a", &lid), Some(true));
        assert_eq!(state.toggle_layer_hidden("a", &lid), Some(true));
        assert_eq!(state.toggle_layer_lock("missing", &lid), None);
        assert!(!state.set_layer_opacity("missing", &lid, 0.5));

        assert!(state.update_layer(
            "a",
            &lid,
            LayerUpdate {
                name: Some("Clouds".into()),
                ..Default::default()
            }
        ));
        assert_eq!(state.find_layer("a", &lid).unwrap().name, "Clouds");
    }

    #[test]
    fn delete_and_reorder_layers() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 10.0));
        let l1 = Layer::new("Back", LayerKind::Image);
        let l2 = Layer::new("Front", LayerKind::Text);
        let (id1, id2) = (l1.id.clone(), l2.id.clone());
        state.add_layer("a", l1);
        state.add_layer("a", l2);

        let mut ordered = state.find_shot("a").unwrap().layers.clone();
        ordered.reverse();
        assert!(state.reorder_layers("a", ordered));
        assert_eq!(state.find_shot("a").unwrap().layers[0].id, id2);
        assert!(!state.reorder_layers("missing", Vec::new()));

        state.select_one(&id1, false);
        assert!(state.delete_layer("a", &id1).is_some());
        assert!(!state.is_selected(&id1));
        assert!(state.delete_layer("a", &id1).is_none());
    }

    #[test]
    fn marker_and_region_crud_prune_dedicated_selection() {
        let mut state = TimelineState::new();
        let marker = Marker::new(12.0, "Beat");
        let mid = marker.id.clone();
        state.add_marker(marker);
        state.select_marker(&mid, false);

        let stamp = state.find_marker(&mid).unwrap().updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(state.update_marker(
            &mid,
            MarkerUpdate {
                time: Some(14.0),
                ..Default::default()
            }
        ));
        assert!(state.find_marker(&mid).unwrap().updated_at > stamp);

        assert!(state.delete_marker(&mid).is_some());
        assert!(!state.selection().is_marker_selected(&mid));
        assert!(state.delete_marker(&mid).is_none());

        let region = Region::new(0.0, 48.0, "Intro");
        let rid = region.id.clone();
        state.add_region(region);
        state.select_region(&rid, false);
        assert!(state.update_region(
            &rid,
            RegionUpdate {
                label: Some("Cold open".into()),
                ..Default::default()
            }
        ));
        assert_eq!(state.find_region(&rid).unwrap().label, "Cold open");
        assert!(state.delete_region(&rid).is_some());
        assert!(!state.selection().is_region_selected(&rid));
        assert!(!state.update_region(&rid, RegionUpdate::default()));
    }

    #[test]
    fn playhead_and_zoom_clamp() {
        let mut state = TimelineState::new();
        state.set_playhead(-10.0);
        assert_eq!(state.playhead_position(), 0.0);
        state.set_playhead(42.0);
        assert_eq!(state.playhead_position(), 42.0);
        state.set_zoom(100.0);
        assert_eq!(state.zoom_level(), MAX_ZOOM);
        state.set_zoom(0.0);
        assert_eq!(state.zoom_level(), MIN_ZOOM);
        state.set_zoom(f64::NAN);
        assert_eq!(state.zoom_level(), MIN_ZOOM);
    }

    #[test]
    fn select_range_positions_one_to_three() {
        let mut state = TimelineState::new();
        for (i, id) in ["s0", "s1", "s2", "s3", "s4"].iter().enumerate() {
            state.add_shot(shot(id, i as f64 * 10.0, 10.0));
        }
        state.select_range("s3", "s1");
        assert_eq!(state.selection().selected_ids(), ["s1", "s2", "s3"]);
        let ids: Vec<&str> = state.selected_shots().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
    }

    #[test]
    fn deserialization_derives_duration() {
        let json = serde_json::json!({
            "shots": [
                { "id": "a", "name": "A", "startTime": 0, "duration": 10 },
                { "id": "b", "name": "B", "startTime": 40, "duration": 20 }
            ],
            "duration": 9999,
            "zoomLevel": 2.0
        });
        let state: TimelineState = serde_json::from_value(json).unwrap();
        assert_eq!(state.duration(), 60.0);
        assert_eq!(state.zoom_level(), 2.0);
        assert_eq!(state.tracks().len(), TrackType::all().len());
    }

    #[test]
    fn deserialization_rejects_invalid_shots() {
        let json = serde_json::json!({
            "shots": [{ "id": "a", "name": "A", "startTime": 0, "duration": 0 }]
        });
        let err = serde_json::from_value::<TimelineState>(json).unwrap_err();
        assert!(err.to_string().contains("duration"));

        let json = serde_json::json!({
            "shots": [
                { "id": "a", "name": "A", "startTime": 0, "duration": 1 },
                { "id": "a", "name": "A2", "startTime": 1, "duration": 1 }
            ]
        });
        let err = serde_json::from_value::<TimelineState>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn serialize_roundtrip() {
        let mut state = TimelineState::new();
        state.add_shot(shot("a", 0.0, 10.0));
        state.add_marker(Marker::new(3.0, "m"));
        state.add_region(Region::new(1.0, 2.0, "r"));
        state.select_one("a", false);
        state.set_playhead(5.0);

        let json = serde_json::to_string(&state).unwrap();
        let restored: TimelineState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(f64, f64),
        Update(usize, Option<f64>, Option<f64>),
        Delete(usize),
        Reverse,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0..500.0f64, 0.5..200.0f64).prop_map(|(s, d)| Op::Add(s, d)),
            (
                0usize..16,
                proptest::option::of(0.0..500.0f64),
                proptest::option::of(0.5..200.0f64)
            )
                .prop_map(|(i, s, d)| Op::Update(i, s, d)),
            (0usize..16).prop_map(Op::Delete),
            Just(Op::Reverse),
        ]
    }

    proptest! {
        #[test]
        fn duration_tracks_max_shot_end(ops in proptest::collection::vec(op(), 1..40)) {
            let mut state = TimelineState::new();
            let mut next = 0usize;
            for op in ops {
                match op {
                    Op::Add(start, duration) => {
                        state.add_shot(shot(&format!("s{next}"), start, duration));
                        next += 1;
                    }
                    Op::Update(i, start_time, duration) => {
                        let id = format!("s{i}");
                        state.update_shot(&id, ShotUpdate { start_time, duration, ..Default::default() });
                    }
                    Op::Delete(i) => {
                        state.delete_shot(&format!("s{i}"));
                    }
                    Op::Reverse => {
                        let mut ordered = state.shots().to_vec();
                        ordered.reverse();
                        state.reorder_shots(ordered);
                    }
                }
                prop_assert_eq!(state.duration(), expected_duration(&state));
            }
        }
    }
}
