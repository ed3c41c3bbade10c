//! The editor session: one place that owns the live state and routes every
//! user intent through history, persistence, and recovery.

use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use sq_app_state::{
    AppSnapshot, AppState, HistoryManager, Layer, Marker, Modifiers, Region, Shot, ShotUpdate, Track,
};
use sq_common::EditorConfig;
use sq_project::{
    apply_to_state, export_to_file, export_with_created, load_project, save_project,
    FileRecoveryStore, ProjectResult, RecoveryManager, RecoveryStore,
};
use tracing::{debug, info, warn};

use crate::shortcut::{is_save_shortcut, KeyChord, Platform};

/// What the user chose when offered a crashed session's snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecoveryChoice {
    Recover,
    Dismiss,
}

/// Details shown in the "restore previous session?" prompt.
#[derive(Clone, Debug, PartialEq)]
pub struct RecoveryPrompt {
    pub snapshot_id: String,
    pub project_name: String,
    pub description: String,
    pub age: String,
    pub created_at: DateTime<Utc>,
}

/// Result of routing a key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a shortcut the session handles.
    Ignored,
    /// Saved to the project's current path.
    Saved(PathBuf),
    /// Save requested but the project has never been saved; the caller
    /// should ask for a path and call [`EditorSession::save`].
    NeedsPath,
}

pub struct EditorSession {
    state: Rc<RefCell<AppState>>,
    history: HistoryManager,
    recovery: RecoveryManager,
    /// State that undo returns to once the history stack is empty. Moves
    /// forward when the depth limit evicts old entries.
    initial: AppSnapshot,
    /// Creation time carried across saves of the same project.
    created: Option<DateTime<Utc>>,
    config: EditorConfig,
    platform: Platform,
}

impl EditorSession {
    pub fn new(config: EditorConfig, store: Box<dyn RecoveryStore>) -> Self {
        let state = Rc::new(RefCell::new(AppState::new()));
        let source = Rc::clone(&state);
        let recovery = RecoveryManager::new(store, &config.recovery, move || {
            AppSnapshot::capture(&source.borrow())
        });
        let initial = AppSnapshot::capture(&state.borrow());

        Self {
            state,
            history: HistoryManager::new(config.history.max_entries),
            recovery,
            initial,
            created: None,
            config,
            platform: Platform::current(),
        }
    }

    /// Session backed by the on-disk recovery store in the configured
    /// directory.
    pub fn with_file_store(config: EditorConfig) -> Self {
        let store = FileRecoveryStore::new(&config.recovery.storage_dir);
        Self::new(config, Box::new(store))
    }

    /// Override the platform used for shortcut matching.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn state(&self) -> Ref<'_, AppState> {
        self.state.borrow()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn recovery(&self) -> &RecoveryManager {
        &self.recovery
    }

    pub fn recovery_mut(&mut self) -> &mut RecoveryManager {
        &mut self.recovery
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ── Edits ──────────────────────────────────────────────

    /// Apply one undoable edit. The post-edit state is recorded under
    /// `label` and the project is marked dirty.
    pub fn perform<R>(&mut self, label: &str, f: impl FnOnce(&mut AppState) -> R) -> R {
        let result = {
            let mut state = self.state.borrow_mut();
            let result = f(&mut state);
            state.mark_dirty();
            result
        };
        let snapshot = AppSnapshot::capture(&self.state.borrow());
        let evicted = self.history.push(label, snapshot);
        self.raise_floor(evicted);
        result
    }

    fn raise_floor(&mut self, evicted: Option<AppSnapshot>) {
        if let Some(floor) = evicted {
            debug!("Undo floor moved past evicted history entry");
            self.initial = floor;
        }
    }

    /// Validate and append a shot.
    pub fn add_shot(&mut self, shot: Shot) -> ProjectResult<()> {
        shot.validate()?;
        self.perform("Add shot", |s| s.timeline.add_shot(shot));
        Ok(())
    }

    /// Add a layer to a shot. Returns `false` for an unknown shot.
    pub fn add_layer(&mut self, shot_id: &str, layer: Layer) -> bool {
        if self.state.borrow().timeline.find_shot(shot_id).is_none() {
            return false;
        }
        self.perform("Add layer", |s| s.timeline.add_layer(shot_id, layer))
    }

    pub fn add_marker(&mut self, marker: Marker) -> ProjectResult<()> {
        marker.validate()?;
        self.perform("Add marker", |s| s.timeline.add_marker(marker));
        Ok(())
    }

    pub fn add_region(&mut self, region: Region) -> ProjectResult<()> {
        region.validate()?;
        self.perform("Add region", |s| s.timeline.add_region(region));
        Ok(())
    }

    /// Validate and apply a shot edit. Returns `Ok(false)` for an unknown id.
    pub fn update_shot(&mut self, id: &str, update: ShotUpdate) -> ProjectResult<bool> {
        update.validate(id)?;
        if self.state.borrow().timeline.find_shot(id).is_none() {
            return Ok(false);
        }
        Ok(self.perform("Edit shot", |s| s.timeline.update_shot(id, update)))
    }

    pub fn delete_shot(&mut self, id: &str) -> bool {
        if self.state.borrow().timeline.find_shot(id).is_none() {
            return false;
        }
        self.perform("Delete shot", |s| s.timeline.delete_shot(id).is_some())
    }

    /// Replace the shot order with a permutation of the current shots.
    pub fn reorder_shots(&mut self, ordered: Vec<Shot>) -> ProjectResult<()> {
        self.state.borrow().timeline.validate_shot_order(&ordered)?;
        self.perform("Reorder shots", |s| s.timeline.reorder_shots(ordered));
        Ok(())
    }

    /// Replace the track order with a permutation of the current tracks.
    pub fn reorder_tracks(&mut self, ordered: Vec<Track>) -> ProjectResult<()> {
        self.state.borrow().timeline.validate_track_order(&ordered)?;
        self.perform("Reorder tracks", |s| s.timeline.reorder_tracks(ordered));
        Ok(())
    }

    /// Selection changes go straight to the timeline without a history entry.
    pub fn select(&mut self, id: &str, modifiers: Modifiers) {
        self.state.borrow_mut().timeline.click(id, modifiers);
    }

    /// Start a continuous gesture (drag, trim). Intermediate edits made with
    /// [`perform`](Self::perform) are not recorded until [`end_gesture`](Self::end_gesture).
    pub fn begin_gesture(&mut self, label: &str) {
        self.history.start_batch(label);
    }

    pub fn end_gesture(&mut self) {
        let snapshot = AppSnapshot::capture(&self.state.borrow());
        let evicted = self.history.end_batch(snapshot);
        self.raise_floor(evicted);
    }

    // ── Undo/redo ──────────────────────────────────────────

    /// Step back one entry. A gesture still open (lost mouse-up) is first
    /// committed as its own entry, so only the gesture is undone.
    pub fn undo(&mut self) -> bool {
        self.commit_open_gesture();
        if self.history.undo().is_none() {
            return false;
        }
        let target = self
            .history
            .current()
            .cloned()
            .unwrap_or_else(|| self.initial.clone());
        self.apply_snapshot(&target);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.commit_open_gesture();
        let Some(target) = self.history.redo().cloned() else {
            return false;
        };
        self.apply_snapshot(&target);
        true
    }

    fn commit_open_gesture(&mut self) {
        if self.history.is_batching() {
            warn!("Committing gesture left open");
            self.end_gesture();
        }
    }

    fn apply_snapshot(&mut self, snapshot: &AppSnapshot) {
        let mut state = self.state.borrow_mut();
        snapshot.restore(&mut state);
        state.mark_dirty();
    }

    // ── Files ──────────────────────────────────────────────

    /// Save to `path` and make it the project's current path.
    pub fn save(&mut self, path: &Path) -> ProjectResult<()> {
        let file = {
            let state = self.state.borrow();
            match self.created {
                Some(created) => export_with_created(&state, &self.config.app_version, created),
                None => export_to_file(&state, &self.config.app_version),
            }
        };
        save_project(&file, path)?;

        self.created = file.created;
        let mut state = self.state.borrow_mut();
        state.project_path = Some(path.to_path_buf());
        state.mark_clean();
        Ok(())
    }

    /// Save to the current path, if the project has one.
    pub fn save_current(&mut self) -> ProjectResult<Option<PathBuf>> {
        let Some(path) = self.state.borrow().project_path.clone() else {
            return Ok(None);
        };
        self.save(&path)?;
        Ok(Some(path))
    }

    /// Load a project file, replacing the sections it carries. History is
    /// cleared and the loaded state becomes the undo floor.
    ///
    /// Returns compatibility warnings for the caller to surface. On error
    /// nothing is applied.
    pub fn open(&mut self, path: &Path) -> ProjectResult<Vec<String>> {
        let loaded = load_project(path, &self.config.app_version)?;
        self.created = loaded.file.created;
        {
            let mut state = self.state.borrow_mut();
            let applied = apply_to_state(loaded.file, &mut state);
            debug!(sections = ?applied, "Applied project sections");
            state.project_path = Some(path.to_path_buf());
            state.mark_clean();
        }
        self.history.clear();
        self.initial = AppSnapshot::capture(&self.state.borrow());
        info!(path = %path.display(), "Opened project");
        Ok(loaded.warnings)
    }

    /// Route a key press. Only the platform save shortcut is handled.
    pub fn handle_key(&mut self, chord: KeyChord) -> ProjectResult<KeyOutcome> {
        if !is_save_shortcut(chord, self.platform) {
            return Ok(KeyOutcome::Ignored);
        }
        Ok(match self.save_current()? {
            Some(path) => KeyOutcome::Saved(path),
            None => KeyOutcome::NeedsPath,
        })
    }

    // ── Recovery ───────────────────────────────────────────

    /// Whether the previous process died mid-session with a snapshot to
    /// offer. Call before [`start_recovery`](Self::start_recovery), which
    /// overwrites the session flags.
    pub fn check_crash(&self) -> ProjectResult<Option<RecoveryPrompt>> {
        if !self.recovery.check_for_crashed_session()? {
            return Ok(None);
        }
        let Some(latest) = self.recovery.latest_snapshot()? else {
            warn!("Previous session crashed but left no recovery snapshot");
            return Ok(None);
        };
        Ok(Some(RecoveryPrompt {
            description: latest.describe(),
            age: latest.age(Utc::now()),
            snapshot_id: latest.id,
            project_name: latest.project_name,
            created_at: latest.created_at,
        }))
    }

    /// Act on the user's answer to the recovery prompt. Returns whether a
    /// snapshot was restored.
    pub fn resolve_recovery(&mut self, choice: RecoveryChoice) -> ProjectResult<bool> {
        match choice {
            RecoveryChoice::Recover => {
                let Some(latest) = self.recovery.latest_snapshot()? else {
                    return Ok(false);
                };
                self.apply_snapshot(&latest.state);
                self.history.clear();
                self.initial = latest.state;
                info!(snapshot = %latest.id, "Recovered previous session");
                Ok(true)
            }
            RecoveryChoice::Dismiss => {
                self.recovery.clear_snapshots()?;
                self.recovery.mark_session_closed()?;
                info!("Dismissed recovery snapshots");
                Ok(false)
            }
        }
    }

    /// Mark the session active and begin periodic snapshots.
    pub fn start_recovery(&mut self) -> ProjectResult<()> {
        self.recovery.start()
    }

    /// Take any due recovery snapshot. Call from the event loop.
    pub fn pump(&mut self) -> bool {
        self.recovery.pump()
    }

    /// Stop the snapshot timer and mark the session cleanly closed.
    pub fn shutdown(&mut self) -> ProjectResult<()> {
        self.recovery.stop()?;
        info!("Editor session closed");
        Ok(())
    }
}
