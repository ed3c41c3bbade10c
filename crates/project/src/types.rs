//! The on-disk project file format.
//!
//! A project file is a single JSON object. The five state sections are
//! optional at the type level so a file missing one can still be parsed and
//! reported on; whether that is acceptable is decided by
//! [`validate_compatibility`](crate::compat::validate_compatibility).
//! Unknown top-level keys are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sq_app_state::{AppSnapshot, AssetLibrary, PanelLayout, ProjectMeta, TimelineState, ToolState};

/// Schema version written by this build.
pub const SCHEMA_VERSION: &str = "1.0";

/// Schema versions this build can read. Matched exactly.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &[SCHEMA_VERSION];

/// The five sections every complete project file carries.
pub const REQUIRED_SECTIONS: [&str; 5] = ["project", "timeline", "assets", "panels", "tools"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Release version of the application that wrote the file.
    pub version: String,
    pub schema_version: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetLibrary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panels: Option<PanelLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolState>,
}

impl ProjectFile {
    /// Build a complete file from a snapshot, stamped with the current time.
    pub fn from_snapshot(snapshot: &AppSnapshot, app_version: &str) -> Self {
        let now = Utc::now();
        Self {
            version: app_version.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            created: Some(now),
            modified: Some(now),
            project: Some(snapshot.project().clone()),
            timeline: Some(snapshot.timeline().clone()),
            assets: Some(snapshot.assets().clone()),
            panels: Some(snapshot.panels().clone()),
            tools: Some(snapshot.tools().clone()),
        }
    }

    /// Names of the required sections this file does not carry.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let present = [
            self.project.is_some(),
            self.timeline.is_some(),
            self.assets.is_some(),
            self.panels.is_some(),
            self.tools.is_some(),
        ];
        REQUIRED_SECTIONS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Display name from the `project` section, if any.
    pub fn name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// The file as a snapshot, when all five sections are present.
    pub fn to_snapshot(&self) -> Option<AppSnapshot> {
        Some(AppSnapshot::from_sections(
            self.timeline.clone()?,
            self.project.clone()?,
            self.assets.clone()?,
            self.panels.clone()?,
            self.tools.clone()?,
        ))
    }
}
