//! Automatic crash recovery.
//!
//! `RecoveryManager` keeps a rotating list of [`RecoverySnapshot`]s and a pair
//! of persisted session flags. It reads live state through a callback
//! supplied at construction, so every capture sees the state at capture time.
//!
//! Lifecycle:
//!
//! ```text
//! startup:   check_for_crashed_session()   (before start, which sets `active`)
//! start():   capture once, mark active, arm timer
//! running:   pump() / tick_due(now) from the owning thread
//! stop():    disarm timer, mark closed
//! ```

mod snapshot;
mod store;
mod timer;

pub use snapshot::{format_timestamp, RecoverySnapshot};
pub use store::{FileRecoveryStore, MemoryRecoveryStore, RecoveryStore, SessionFlags};
pub use timer::RecoveryTimer;

use std::time::{Duration, Instant};

use sq_app_state::AppSnapshot;
use sq_common::RecoveryConfig;
use tracing::{debug, error, info, warn};

use crate::error::ProjectResult;

/// Supplies the current editor state on demand.
pub type StateSource = Box<dyn Fn() -> AppSnapshot>;

pub struct RecoveryManager {
    store: Box<dyn RecoveryStore>,
    source: StateSource,
    max_snapshots: usize,
    interval: Duration,
    timer: Option<RecoveryTimer>,
    running: bool,
    last_capture: Option<Instant>,
}

impl RecoveryManager {
    pub fn new(
        store: Box<dyn RecoveryStore>,
        config: &RecoveryConfig,
        source: impl Fn() -> AppSnapshot + 'static,
    ) -> Self {
        Self {
            store,
            source: Box::new(source),
            max_snapshots: config.max_snapshots.max(1),
            interval: config.interval(),
            timer: None,
            running: false,
            last_capture: None,
        }
    }

    /// Override the snapshot period. Takes effect on the next `start`.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_snapshots(&self) -> usize {
        self.max_snapshots
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // --- session flags ---

    /// True when the previous process marked its session active and never
    /// closed it. Call before [`start`](Self::start).
    pub fn check_for_crashed_session(&self) -> ProjectResult<bool> {
        let crashed = self.store.load_flags()?.indicates_crash();
        if crashed {
            info!("Previous session did not shut down cleanly");
        }
        Ok(crashed)
    }

    pub fn mark_session_active(&mut self) -> ProjectResult<()> {
        self.store.save_flags(SessionFlags::ACTIVE)
    }

    pub fn mark_session_closed(&mut self) -> ProjectResult<()> {
        self.store.save_flags(SessionFlags::CLOSED)
    }

    // --- lifecycle ---

    /// Capture one snapshot immediately, mark the session active, and arm the
    /// background timer. A failed initial capture is logged; a failed flag
    /// write is returned.
    pub fn start(&mut self) -> ProjectResult<()> {
        if self.running {
            warn!("Recovery manager already running");
            return Ok(());
        }

        if let Err(e) = self.capture_now() {
            error!(error = %e, "Initial recovery snapshot failed; will retry on next tick");
        }
        self.mark_session_active()?;
        self.timer = Some(RecoveryTimer::spawn(self.interval)?);
        self.running = true;

        info!(
            interval_secs = self.interval.as_secs(),
            max_snapshots = self.max_snapshots,
            "Recovery manager started"
        );
        Ok(())
    }

    /// Disarm the timer and mark the session closed. The only normal path
    /// that clears the crash signal.
    pub fn stop(&mut self) -> ProjectResult<()> {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
        self.running = false;
        self.mark_session_closed()?;
        info!("Recovery manager stopped");
        Ok(())
    }

    /// Drain pending timer ticks and capture once if any arrived. Returns
    /// whether a snapshot was written. Failures are logged, not returned; the
    /// next tick retries.
    pub fn pump(&mut self) -> bool {
        let ticks = self.timer.as_ref().map_or(0, RecoveryTimer::drain);
        if ticks == 0 {
            return false;
        }
        debug!(ticks, "Recovery tick");
        self.capture_logged()
    }

    /// Polling alternative to the timer thread: capture when `interval` has
    /// elapsed since the last capture attempt.
    pub fn tick_due(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let due = self
            .last_capture
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if !due {
            return false;
        }
        self.capture_logged()
    }

    fn capture_logged(&mut self) -> bool {
        match self.capture_now() {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Recovery snapshot failed; will retry on next tick");
                false
            }
        }
    }

    // --- snapshots ---

    /// Capture the current state and append it, evicting the oldest
    /// snapshots beyond the rotation cap.
    pub fn capture_now(&mut self) -> ProjectResult<RecoverySnapshot> {
        self.last_capture = Some(Instant::now());
        let snapshot = RecoverySnapshot::capture((self.source)());

        let mut snapshots = self.store.load_snapshots()?;
        snapshots.push(snapshot.clone());
        let excess = snapshots.len().saturating_sub(self.max_snapshots);
        if excess > 0 {
            snapshots.drain(..excess);
            debug!(evicted = excess, "Evicted oldest recovery snapshots");
        }
        self.store.save_snapshots(&snapshots)?;

        debug!(
            id = %snapshot.id,
            shots = snapshot.shot_count,
            stored = snapshots.len(),
            "Recovery snapshot captured"
        );
        Ok(snapshot)
    }

    /// All stored snapshots, newest first.
    pub fn get_recovery_snapshots(&self) -> ProjectResult<Vec<RecoverySnapshot>> {
        let mut snapshots = self.store.load_snapshots()?;
        snapshots.reverse();
        Ok(snapshots)
    }

    pub fn latest_snapshot(&self) -> ProjectResult<Option<RecoverySnapshot>> {
        Ok(self.store.load_snapshots()?.pop())
    }

    pub fn get_snapshot(&self, id: &str) -> ProjectResult<Option<RecoverySnapshot>> {
        Ok(self
            .store
            .load_snapshots()?
            .into_iter()
            .find(|s| s.id == id))
    }

    /// Remove one snapshot. Returns whether it existed.
    pub fn delete_snapshot(&mut self, id: &str) -> ProjectResult<bool> {
        let mut snapshots = self.store.load_snapshots()?;
        let before = snapshots.len();
        snapshots.retain(|s| s.id != id);
        if snapshots.len() == before {
            return Ok(false);
        }
        self.store.save_snapshots(&snapshots)?;
        debug!(id, "Deleted recovery snapshot");
        Ok(true)
    }

    pub fn clear_snapshots(&mut self) -> ProjectResult<()> {
        self.store.save_snapshots(&[])?;
        info!("Cleared recovery snapshots");
        Ok(())
    }
}

impl Drop for RecoveryManager {
    // Disarm the thread but leave the flags alone: dropping without `stop`
    // is indistinguishable from a crash, which is what the next run should see.
    fn drop(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_app_state::{AppState, Shot};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config(max: usize) -> RecoveryConfig {
        RecoveryConfig {
            max_snapshots: max,
            ..RecoveryConfig::default()
        }
    }

    fn manager_with(
        store: &MemoryRecoveryStore,
        max: usize,
    ) -> (RecoveryManager, Rc<RefCell<AppState>>) {
        let state = Rc::new(RefCell::new(AppState::new()));
        let source = Rc::clone(&state);
        let mgr = RecoveryManager::new(Box::new(store.clone()), &config(max), move || {
            AppSnapshot::capture(&source.borrow())
        });
        (mgr, state)
    }

    #[test]
    fn active_alone_is_a_crash() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        assert!(!mgr.check_for_crashed_session().unwrap());
        mgr.mark_session_active().unwrap();
        assert!(mgr.check_for_crashed_session().unwrap());
        mgr.mark_session_closed().unwrap();
        assert!(!mgr.check_for_crashed_session().unwrap());
    }

    #[test]
    fn start_captures_immediately_and_marks_active() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        mgr.start().unwrap();
        assert!(mgr.is_running());
        assert_eq!(mgr.get_recovery_snapshots().unwrap().len(), 1);
        assert!(store.load_flags().unwrap().indicates_crash());

        mgr.stop().unwrap();
        assert!(!mgr.is_running());
        assert!(!store.load_flags().unwrap().indicates_crash());
    }

    #[test]
    fn drop_without_stop_looks_like_crash() {
        let store = MemoryRecoveryStore::new();
        {
            let (mut mgr, _) = manager_with(&store, 10);
            mgr.start().unwrap();
        }
        let (next, _) = manager_with(&store, 10);
        assert!(next.check_for_crashed_session().unwrap());
        assert_eq!(next.latest_snapshot().unwrap().map(|s| s.shot_count), Some(0));
    }

    #[test]
    fn captures_read_live_state() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, state) = manager_with(&store, 10);
        mgr.capture_now().unwrap();
        state
            .borrow_mut()
            .timeline
            .add_shot(Shot::new("Later", 0.0, 30.0));
        let snap = mgr.capture_now().unwrap();
        assert_eq!(snap.shot_count, 1);
        assert_eq!(snap.duration, 30.0);
    }

    #[test]
    fn rotation_keeps_newest() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        let ids: Vec<String> = (0..11).map(|_| mgr.capture_now().unwrap().id).collect();

        let listed = mgr.get_recovery_snapshots().unwrap();
        assert_eq!(listed.len(), 10);
        assert_eq!(listed[0].id, ids[10]);
        assert_eq!(listed[9].id, ids[1]);
        assert!(listed.iter().all(|s| s.id != ids[0]));
    }

    #[test]
    fn delete_and_clear() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        let a = mgr.capture_now().unwrap();
        let b = mgr.capture_now().unwrap();

        assert!(mgr.delete_snapshot(&a.id).unwrap());
        assert!(!mgr.delete_snapshot(&a.id).unwrap());
        assert_eq!(mgr.get_snapshot(&b.id).unwrap().map(|s| s.id), Some(b.id.clone()));

        mgr.clear_snapshots().unwrap();
        assert!(mgr.latest_snapshot().unwrap().is_none());
    }

    #[test]
    fn tick_due_respects_interval() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        let now = Instant::now();
        assert!(!mgr.tick_due(now), "not running yet");

        mgr.start().unwrap();
        assert!(!mgr.tick_due(Instant::now()));
        assert!(mgr.tick_due(Instant::now() + mgr.interval()));
        assert_eq!(mgr.get_recovery_snapshots().unwrap().len(), 2);
        mgr.stop().unwrap();
    }

    #[test]
    fn failed_tick_is_logged_and_retried() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        mgr.start().unwrap();

        store.set_fail_writes(true);
        assert!(!mgr.tick_due(Instant::now() + mgr.interval()));
        assert!(mgr.is_running());

        store.set_fail_writes(false);
        assert!(mgr.tick_due(Instant::now() + mgr.interval() * 2));
        assert_eq!(mgr.get_recovery_snapshots().unwrap().len(), 2);
        mgr.stop().unwrap();
    }

    #[test]
    fn start_fails_when_flags_cannot_be_written() {
        let store = MemoryRecoveryStore::new();
        store.set_fail_writes(true);
        let (mut mgr, _) = manager_with(&store, 10);
        assert!(mgr.start().is_err());
        assert!(!mgr.is_running());
    }

    #[test]
    fn pump_captures_on_timer_tick() {
        let store = MemoryRecoveryStore::new();
        let (mut mgr, _) = manager_with(&store, 10);
        mgr.set_interval(Duration::from_millis(10));
        mgr.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut captured = false;
        while !captured && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(15));
            captured = mgr.pump();
        }
        assert!(captured);
        mgr.stop().unwrap();
        assert!(!mgr.pump());
    }
}
