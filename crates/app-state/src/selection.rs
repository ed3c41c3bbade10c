//! Element, marker, and region selection state.
//!
//! Selection is id-based. Range selection resolves ids to *list positions* in
//! the shot list at the moment of the gesture; after that the result is plain
//! ids again, so a later reorder never changes what is selected.

use serde::{Deserialize, Serialize};

use crate::model::Shot;

/// Modifier keys held during a selection gesture.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        command: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        command: false,
    };
    pub const COMMAND: Self = Self {
        shift: false,
        command: true,
    };
}

/// Tracks which shots/layers, markers, and regions are selected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Generic element selection (shot and layer ids).
    #[serde(default)]
    selected_ids: Vec<String>,
    /// Anchor for the next shift-click range.
    #[serde(default)]
    last_selected: Option<String>,
    #[serde(default)]
    selected_marker_ids: Vec<String>,
    #[serde(default)]
    selected_region_ids: Vec<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select one element. Non-additive selection replaces the set.
    pub fn select_one(&mut self, id: &str, additive: bool) {
        if !additive {
            self.selected_ids.clear();
        }
        if !self.is_selected(id) {
            self.selected_ids.push(id.to_string());
        }
        self.last_selected = Some(id.to_string());
        tracing::debug!(id, additive, count = self.selected_ids.len(), "Selected element");
    }

    /// Remove `id` if selected, otherwise add it.
    pub fn toggle(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected_ids.retain(|s| s != id);
        } else {
            self.selected_ids.push(id.to_string());
        }
        self.last_selected = Some(id.to_string());
    }

    /// Select every shot between `anchor_id` and `target_id` in list order,
    /// inclusive, replacing the current selection.
    ///
    /// No-op when either id is not in `shots`.
    pub fn select_range(&mut self, shots: &[Shot], anchor_id: &str, target_id: &str) {
        let anchor = shots.iter().position(|s| s.id == anchor_id);
        let target = shots.iter().position(|s| s.id == target_id);
        let (Some(anchor), Some(target)) = (anchor, target) else {
            tracing::debug!(anchor_id, target_id, "Range select ignored: id not in shot list");
            return;
        };

        let (lo, hi) = (anchor.min(target), anchor.max(target));
        self.selected_ids = shots[lo..=hi].iter().map(|s| s.id.clone()).collect();
        self.last_selected = Some(target_id.to_string());
        tracing::debug!(lo, hi, "Range selected");
    }

    /// Resolve a click with modifiers: range (shift with an anchor) beats
    /// toggle (command), which beats exclusive select.
    pub fn handle_click(&mut self, shots: &[Shot], id: &str, modifiers: Modifiers) {
        if modifiers.shift {
            if let Some(anchor) = self.last_selected.clone() {
                self.select_range(shots, &anchor, id);
                return;
            }
        }
        if modifiers.command {
            self.toggle(id);
        } else {
            self.select_one(id, false);
        }
    }

    /// Select every shot in the list.
    pub fn select_all(&mut self, shots: &[Shot]) {
        self.selected_ids = shots.iter().map(|s| s.id.clone()).collect();
    }

    /// Clear the element selection and the range anchor.
    pub fn clear(&mut self) {
        self.selected_ids.clear();
        self.last_selected = None;
    }

    /// Clear element, marker, and region selection.
    pub fn clear_all(&mut self) {
        self.clear();
        self.selected_marker_ids.clear();
        self.selected_region_ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected_ids
    }

    pub fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    /// Shots whose ids are selected, in list order.
    pub fn selected_items<'a>(&self, shots: &'a [Shot]) -> Vec<&'a Shot> {
        shots.iter().filter(|s| self.is_selected(&s.id)).collect()
    }

    /// Drop an element id (used when the element is deleted). The range
    /// anchor is left alone: a shift-click against a deleted anchor is a no-op.
    pub(crate) fn forget(&mut self, id: &str) {
        self.selected_ids.retain(|s| s != id);
    }

    // --- markers ---

    pub fn select_marker(&mut self, id: &str, additive: bool) {
        select_into(&mut self.selected_marker_ids, id, additive);
    }

    pub fn is_marker_selected(&self, id: &str) -> bool {
        self.selected_marker_ids.iter().any(|s| s == id)
    }

    pub fn selected_marker_ids(&self) -> &[String] {
        &self.selected_marker_ids
    }

    pub(crate) fn forget_marker(&mut self, id: &str) {
        self.selected_marker_ids.retain(|s| s != id);
    }

    // --- regions ---

    pub fn select_region(&mut self, id: &str, additive: bool) {
        select_into(&mut self.selected_region_ids, id, additive);
    }

    pub fn is_region_selected(&self, id: &str) -> bool {
        self.selected_region_ids.iter().any(|s| s == id)
    }

    pub fn selected_region_ids(&self) -> &[String] {
        &self.selected_region_ids
    }

    pub(crate) fn forget_region(&mut self, id: &str) {
        self.selected_region_ids.retain(|s| s != id);
    }

    /// Returns true if nothing is selected in any category.
    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
            && self.selected_marker_ids.is_empty()
            && self.selected_region_ids.is_empty()
    }

    /// Drop duplicate ids (files written by hand can repeat them).
    pub(crate) fn dedup(&mut self) {
        for list in [
            &mut self.selected_ids,
            &mut self.selected_marker_ids,
            &mut self.selected_region_ids,
        ] {
            let mut seen = std::collections::HashSet::new();
            list.retain(|id| seen.insert(id.clone()));
        }
    }
}

fn select_into(list: &mut Vec<String>, id: &str, additive: bool) {
    if !additive {
        list.clear();
    }
    if !list.iter().any(|s| s == id) {
        list.push(id.to_string());
    }
}
