//! Immutable captures of the five project sections.
//!
//! `AppSnapshot` is what undo/redo entries and recovery snapshots hold. Its
//! fields are private: once captured a snapshot is only read back whole, via
//! [`AppSnapshot::restore`], or section by section through the accessors.

use serde::{Deserialize, Serialize};

use crate::state::{AppState, AssetLibrary, PanelLayout, ProjectMeta, ToolState};
use crate::timeline::TimelineState;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    timeline: TimelineState,
    project: ProjectMeta,
    assets: AssetLibrary,
    panels: PanelLayout,
    tools: ToolState,
}

impl AppSnapshot {
    /// Capture the current application state.
    pub fn capture(state: &AppState) -> Self {
        Self {
            timeline: state.timeline.clone(),
            project: state.project.clone(),
            assets: state.assets.clone(),
            panels: state.panels.clone(),
            tools: state.tools.clone(),
        }
    }

    /// Build a snapshot from already-owned sections.
    pub fn from_sections(
        timeline: TimelineState,
        project: ProjectMeta,
        assets: AssetLibrary,
        panels: PanelLayout,
        tools: ToolState,
    ) -> Self {
        Self {
            timeline,
            project,
            assets,
            panels,
            tools,
        }
    }

    /// Overwrite the five sections of `state` with this snapshot.
    ///
    /// Does NOT change `project_path` or `is_dirty`; those are managed by
    /// the session.
    pub fn restore(&self, state: &mut AppState) {
        state.timeline = self.timeline.clone();
        state.project = self.project.clone();
        state.assets = self.assets.clone();
        state.panels = self.panels.clone();
        state.tools = self.tools.clone();

        tracing::debug!(
            shots = state.timeline.shots().len(),
            tracks = state.timeline.tracks().len(),
            "Snapshot restored"
        );
    }

    pub fn timeline(&self) -> &TimelineState {
        &self.timeline
    }

    pub fn project(&self) -> &ProjectMeta {
        &self.project
    }

    pub fn assets(&self) -> &AssetLibrary {
        &self.assets
    }

    pub fn panels(&self) -> &PanelLayout {
        &self.panels
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }
}
