//! Project serialization: building a `ProjectFile` from live state and
//! writing it to disk.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sq_app_state::{AppSnapshot, AppState};
use tracing::{debug, info};

use crate::error::{ProjectError, ProjectResult};
use crate::types::ProjectFile;

/// Capture the five state sections into a file stamped with `app_version`,
/// the current schema version, and fresh timestamps.
pub fn export_to_file(state: &AppState, app_version: &str) -> ProjectFile {
    ProjectFile::from_snapshot(&AppSnapshot::capture(state), app_version)
}

/// Like [`export_to_file`], but keeps an earlier creation time.
pub fn export_with_created(
    state: &AppState,
    app_version: &str,
    created: DateTime<Utc>,
) -> ProjectFile {
    let mut file = export_to_file(state, app_version);
    file.created = Some(created);
    file
}

/// Serialize a project to a pretty-printed JSON string.
pub fn to_json_string(project: &ProjectFile) -> ProjectResult<String> {
    let json = serde_json::to_string_pretty(project)?;
    debug!(
        project_name = project.name().unwrap_or_default(),
        json_len = json.len(),
        "Serialized project to JSON"
    );
    Ok(json)
}

/// Save a project to `path`, atomically.
pub fn save_project(project: &ProjectFile, path: &Path) -> ProjectResult<()> {
    let json = to_json_string(project)?;
    write_atomic(path, json.as_bytes())?;

    info!(
        project_name = project.name().unwrap_or_default(),
        path = %path.display(),
        "Project saved successfully"
    );
    Ok(())
}

/// Write to a temporary sibling file, then rename over the target, so a crash
/// mid-write never leaves a truncated file behind.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> ProjectResult<()> {
    let temp_path = temp_sibling(path);

    std::fs::write(&temp_path, bytes).map_err(|e| {
        tracing::error!(path = %temp_path.display(), error = %e, "Failed to write temp file");
        ProjectError::Io(e)
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| {
        // Best effort; the rename error is what gets reported.
        let _ = std::fs::remove_file(&temp_path);
        tracing::error!(
            from = %temp_path.display(),
            to = %path.display(),
            error = %e,
            "Failed to rename temp file to target"
        );
        ProjectError::Io(e)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("project"));
    name.push(".tmp");
    path.with_file_name(name)
}
