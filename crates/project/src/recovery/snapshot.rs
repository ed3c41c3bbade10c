//! Persisted recovery snapshots and their human-readable timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sq_app_state::AppSnapshot;
use sq_common::{new_id, Frames};

/// One automatic capture of the full editor state.
///
/// The summary fields (`project_name`, `shot_count`, `duration`) are copied
/// out at capture time so listing snapshots never has to walk `state`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub project_name: String,
    pub shot_count: usize,
    pub duration: Frames,
    pub state: AppSnapshot,
}

impl RecoverySnapshot {
    pub fn capture(state: AppSnapshot) -> Self {
        Self::capture_at(state, Utc::now())
    }

    pub fn capture_at(state: AppSnapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            created_at,
            project_name: state.project().name.clone(),
            shot_count: state.timeline().shots().len(),
            duration: state.timeline().duration(),
            state,
        }
    }

    /// One-line summary, e.g. `Pilot: 3 shots, 120 frames`.
    pub fn describe(&self) -> String {
        format!(
            "{}: {} {}, {} frames",
            self.project_name,
            self.shot_count,
            plural(self.shot_count as i64, "shot"),
            self.duration
        )
    }

    /// Age of the snapshot relative to `now`, formatted for display.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        format_timestamp(self.created_at, now)
    }
}

/// Relative time between `then` and `now`: "Just now" under a minute, then
/// whole minutes, hours, and days. Future timestamps read as "Just now".
pub fn format_timestamp(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        return "Just now".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return format!("{minutes} {} ago", plural(minutes, "minute"));
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} {} ago", plural(hours, "hour"));
    }
    let days = hours / 24;
    format!("{days} {} ago", plural(days, "day"))
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}
