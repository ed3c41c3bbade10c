//! `sq-editor` -- the editor session that ties state, history, persistence,
//! and crash recovery together, plus the `sequencer` command-line tool.

pub mod session;
pub mod shortcut;

pub use session::{EditorSession, KeyOutcome, RecoveryChoice, RecoveryPrompt};
pub use shortcut::{is_save_shortcut, save_shortcut, KeyChord, Platform};
