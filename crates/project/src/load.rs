//! Project deserialization: parsing, loading from disk, and applying a
//! parsed file to live state.
//!
//! Loading fails closed. Nothing touches live state until a file has parsed,
//! passed the compatibility check, and been handed to [`apply_to_state`].

use std::path::Path;

use serde_json::Value;
use sq_app_state::AppState;
use tracing::{debug, info, warn};

use crate::compat::{validate_compatibility, CompatibilityReport};
use crate::error::{ProjectError, ProjectResult};
use crate::types::{ProjectFile, SCHEMA_VERSION, SUPPORTED_SCHEMA_VERSIONS};

/// Parse a project file from raw JSON text.
///
/// Errors, in the order they are checked: malformed JSON or a non-object
/// root (`Format`), absent `version`/`schema_version` (`MissingVersion`),
/// an unsupported schema (`UnsupportedSchema`), and finally any section that
/// fails entity validation (`Format`).
pub fn parse(raw: &str) -> ProjectResult<ProjectFile> {
    let mut value: Value =
        serde_json::from_str(raw).map_err(|e| ProjectError::Format(e.to_string()))?;

    let obj = value
        .as_object_mut()
        .ok_or_else(|| ProjectError::Format("project root must be a JSON object".into()))?;

    let version = version_tag(obj, "version")?;
    let schema = version_tag(obj, "schema_version")?;

    if !SUPPORTED_SCHEMA_VERSIONS.contains(&schema.as_str()) {
        return Err(ProjectError::UnsupportedSchema {
            found: schema,
            expected: SCHEMA_VERSION.to_string(),
        });
    }

    // Older writers stored numeric tags; normalize to strings.
    obj.insert("version".into(), Value::String(version));
    obj.insert("schema_version".into(), Value::String(schema));

    let file: ProjectFile =
        serde_json::from_value(value).map_err(|e| ProjectError::Format(e.to_string()))?;

    debug!(
        version = %file.version,
        missing = ?file.missing_sections(),
        "Parsed project file"
    );
    Ok(file)
}

fn version_tag(obj: &serde_json::Map<String, Value>, field: &'static str) -> ProjectResult<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ProjectError::MissingVersion { field }),
    }
}

/// A file that parsed and passed the compatibility check.
#[derive(Clone, Debug)]
pub struct LoadedProject {
    pub file: ProjectFile,
    /// Non-blocking notes to show the user (e.g. newer writer version).
    pub warnings: Vec<String>,
}

/// Read, parse, and compatibility-check a project file.
///
/// Returns `Incompatible` (with every reason) instead of a partial file.
pub fn load_project(path: &Path, app_version: &str) -> ProjectResult<LoadedProject> {
    if !path.is_file() {
        return Err(ProjectError::NotFound {
            path: path.display().to_string(),
        });
    }

    let json = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read project file");
        ProjectError::Io(e)
    })?;

    let file = parse(&json)?;
    let CompatibilityReport {
        compatible,
        errors,
        warnings,
    } = validate_compatibility(&file, app_version);

    if !compatible {
        warn!(path = %path.display(), ?errors, "Refusing to load incompatible project");
        return Err(ProjectError::Incompatible { errors });
    }
    for warning in &warnings {
        warn!(path = %path.display(), "{warning}");
    }

    info!(
        project_name = file.name().unwrap_or_default(),
        path = %path.display(),
        shots = file.timeline.as_ref().map_or(0, |t| t.shots().len()),
        "Project loaded successfully"
    );

    Ok(LoadedProject { file, warnings })
}

/// Hand each section present in `file` to its owner in `state`.
///
/// Sections absent from the file leave the live section untouched. Returns
/// the names of the sections that were applied.
pub fn apply_to_state(file: ProjectFile, state: &mut AppState) -> Vec<&'static str> {
    let mut applied = Vec::with_capacity(5);
    if let Some(project) = file.project {
        state.project = project;
        applied.push("project");
    }
    if let Some(timeline) = file.timeline {
        state.timeline = timeline;
        applied.push("timeline");
    }
    if let Some(assets) = file.assets {
        state.assets = assets;
        applied.push("assets");
    }
    if let Some(panels) = file.panels {
        state.panels = panels;
        applied.push("panels");
    }
    if let Some(tools) = file.tools {
        state.tools = tools;
        applied.push("tools");
    }
    debug!(?applied, "Applied project sections");
    applied
}
