//! `sq-app-state` -- in-memory project state for the sequence editor.
//!
//! This crate provides:
//!
//! - **`TimelineState`**: the timeline store (shots, tracks, layers, markers,
//!   regions, playhead, zoom) with a derived `duration`.
//! - **`SelectionState`**: single, toggle, and range selection over shot ids.
//! - **`HistoryManager`**: bounded undo/redo over post-action snapshots.
//! - **`AppState`** / **`AppSnapshot`**: the five-section composite and its
//!   immutable capture.
//!
//! # Architecture
//!
//! ```text
//! AppState
//! ├── timeline: TimelineState
//! │   ├── shots (each owning its layers)
//! │   ├── tracks, markers, regions
//! │   └── selection: SelectionState
//! ├── project: ProjectMeta
//! ├── assets: AssetLibrary
//! ├── panels: PanelLayout
//! └── tools: ToolState
//!
//! HistoryManager<AppSnapshot>
//! ├── undo_stack (top = live state)
//! └── redo_stack
//! ```

pub mod error;
pub mod history;
pub mod model;
pub mod selection;
pub mod snapshot;
pub mod state;
pub mod timeline;
pub mod update;

pub use error::{ModelError, ModelResult};
pub use history::{HistoryEntry, HistoryManager};
pub use model::{
    default_tracks, GenerationParams, GenerationStatus, Layer, LayerKind, Marker, ReferenceImage,
    Region, Shot, Track, TrackType, VisualStyleApplication,
};
pub use selection::{Modifiers, SelectionState};
pub use snapshot::AppSnapshot;
pub use state::{
    AppState, Asset, AssetKind, AssetLibrary, PanelLayout, ProjectMeta, Tool, ToolState,
};
pub use timeline::{TimelineState, MAX_ZOOM, MIN_ZOOM};
pub use update::{LayerUpdate, MarkerUpdate, RegionUpdate, ShotUpdate, TrackUpdate};
