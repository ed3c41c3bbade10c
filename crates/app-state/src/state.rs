//! Central application state container.
//!
//! `AppState` groups the timeline store with its four sibling sections
//! (project metadata, assets, panel layout, active tool). These five sections
//! are what history snapshots, project files, and recovery snapshots carry.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::timeline::TimelineState;

/// Single source of truth for the editor.
///
/// `project_path` and `is_dirty` describe the session, not the project, and
/// are never captured in snapshots.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub timeline: TimelineState,
    pub project: ProjectMeta,
    pub assets: AssetLibrary,
    pub panels: PanelLayout,
    pub tools: ToolState,

    /// File the project was last saved to or opened from.
    pub project_path: Option<PathBuf>,
    /// Whether there are unsaved changes.
    pub is_dirty: bool,
}

/// Project-level metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMeta {
    pub name: String,
    pub description: String,
    /// Frames per second; converts frame units to wall time.
    pub frame_rate: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: String::new(),
            frame_rate: 24.0,
            width: 1920,
            height: 1080,
        }
    }
}

/// Kind of an imported asset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Image,
    Video,
    Audio,
    /// A saved visual style preset.
    Style,
}

/// An entry in the asset library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    /// Path or URI of the asset data.
    pub uri: String,
    #[serde(rename = "type", default)]
    pub kind: AssetKind,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Asset {
    pub fn new(name: impl Into<String>, uri: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            id: sq_common::new_id(),
            name: name.into(),
            uri: uri.into(),
            kind,
            tags: Vec::new(),
        }
    }
}

/// Imported assets available to shots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetLibrary {
    pub items: Vec<Asset>,
}

impl AssetLibrary {
    pub fn add(&mut self, asset: Asset) {
        tracing::debug!(asset_id = %asset.id, name = %asset.name, "Adding asset");
        self.items.push(asset);
    }

    pub fn remove(&mut self, id: &str) -> Option<Asset> {
        let pos = self.items.iter().position(|a| a.id == id)?;
        tracing::debug!(asset_id = id, "Removed asset");
        Some(self.items.remove(pos))
    }

    pub fn find(&self, id: &str) -> Option<&Asset> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sizes and visibility of the editor panels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelLayout {
    pub timeline_height: u32,
    pub inspector_width: u32,
    pub library_width: u32,
    pub inspector_visible: bool,
    pub library_visible: bool,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            timeline_height: 320,
            inspector_width: 300,
            library_width: 260,
            inspector_visible: true,
            library_visible: true,
        }
    }
}

/// Timeline editing tool.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Razor,
    Hand,
    Zoom,
    Text,
}

/// Active tool and its toggles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolState {
    pub active: Tool,
    pub snapping: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active: Tool::Select,
            snapping: true,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the project as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        if !self.is_dirty {
            self.is_dirty = true;
            tracing::debug!(project = %self.project.name, "Project marked as dirty");
        }
    }

    /// Mark the project as saved.
    pub fn mark_clean(&mut self) {
        if self.is_dirty {
            self.is_dirty = false;
            tracing::debug!(project = %self.project.name, "Project marked as clean");
        }
    }

    /// Project display name.
    pub fn project_name(&self) -> &str {
        &self.project.name
    }
}
