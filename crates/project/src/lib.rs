//! `sq-project` -- persistence for the sequence editor.
//!
//! Two independent paths share the same state shape:
//!
//! - **Save/Load**: `ProjectFile` to/from versioned JSON, with an exact-match
//!   schema check and a compatibility report before anything is applied.
//! - **Recovery**: a rotating list of automatic snapshots plus persisted
//!   session flags for crash detection across process lifetimes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sq_app_state::AppState;
//! use sq_project::{apply_to_state, export_to_file, load_project, save_project};
//! use std::path::Path;
//!
//! let state = AppState::new();
//! let file = export_to_file(&state, "1.0.0");
//! save_project(&file, Path::new("cut.seq.json")).unwrap();
//!
//! let loaded = load_project(Path::new("cut.seq.json"), "1.0.0").unwrap();
//! let mut fresh = AppState::new();
//! apply_to_state(loaded.file, &mut fresh);
//! ```

pub mod compat;
pub mod error;
pub mod load;
pub mod recovery;
pub mod save;
pub mod types;

// Re-export primary API at crate root
pub use compat::{validate_compatibility, CompatibilityReport};
pub use error::{ProjectError, ProjectResult};
pub use load::{apply_to_state, load_project, parse, LoadedProject};
pub use recovery::{
    format_timestamp, FileRecoveryStore, MemoryRecoveryStore, RecoveryManager, RecoverySnapshot,
    RecoveryStore, RecoveryTimer, SessionFlags, StateSource,
};
pub use save::{export_to_file, export_with_created, save_project, to_json_string};
pub use types::{ProjectFile, REQUIRED_SECTIONS, SCHEMA_VERSION, SUPPORTED_SCHEMA_VERSIONS};
