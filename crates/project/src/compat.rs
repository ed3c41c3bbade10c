//! Compatibility checks between a parsed project file and the running build.

use crate::types::{ProjectFile, SUPPORTED_SCHEMA_VERSIONS};

/// Outcome of [`validate_compatibility`]. Errors make a file unloadable;
/// warnings are shown to the user but do not block loading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a file against the running application version.
///
/// Incompatible when the schema version is unsupported or any of the five
/// sections is missing. A file written by a newer application version (plain
/// string comparison) only produces a warning.
pub fn validate_compatibility(file: &ProjectFile, app_version: &str) -> CompatibilityReport {
    let mut report = CompatibilityReport::default();

    if !SUPPORTED_SCHEMA_VERSIONS.contains(&file.schema_version.as_str()) {
        report.errors.push(format!(
            "unsupported schema version {:?}; this build reads {}",
            file.schema_version,
            SUPPORTED_SCHEMA_VERSIONS.join(", ")
        ));
    }

    for section in file.missing_sections() {
        report
            .errors
            .push(format!("missing required section `{section}`"));
    }

    if file.version.as_str() > app_version {
        report.warnings.push(format!(
            "file was written by version {} (running {app_version}); loading best-effort",
            file.version
        ));
    }

    report.compatible = report.errors.is_empty();
    tracing::debug!(
        compatible = report.compatible,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Compatibility checked"
    );
    report
}
