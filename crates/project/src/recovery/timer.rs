//! Background tick source for periodic recovery snapshots.
//!
//! The timer thread never touches editor state. It only sends ticks over a
//! crossbeam channel; the state-owning thread drains them and captures.
//!
//! ```text
//! RecoveryTimer::spawn(interval)
//!   |
//!   +-- "recovery-timer" thread
//!   |     loop: wait `interval` on the stop channel
//!   |           timeout      -> try_send(tick)   (full channel: tick coalesced)
//!   |           stop/dropped -> exit
//!   |
//!   +-- owner: try_tick() / drain() from its own loop
//! ```

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, info};

use crate::error::ProjectResult;

/// Handle to a running tick thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct RecoveryTimer {
    ticks: Receiver<Instant>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl RecoveryTimer {
    /// Spawn the tick thread.
    pub fn spawn(interval: Duration) -> ProjectResult<Self> {
        // Capacity 1: ticks missed while the owner was busy collapse into one.
        let (tick_tx, tick_rx) = channel::bounded::<Instant>(1);
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name("recovery-timer".to_string())
            .spawn(move || Self::run(interval, tick_tx, stop_rx))?;

        info!(interval_ms = interval.as_millis() as u64, "Recovery timer started");
        Ok(Self {
            ticks: tick_rx,
            stop: Some(stop_tx),
            handle: Some(handle),
            interval,
        })
    }

    fn run(interval: Duration, ticks: Sender<Instant>, stop: Receiver<()>) {
        loop {
            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => match ticks.try_send(Instant::now()) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                },
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("Recovery timer thread exiting");
    }

    /// Take a pending tick without blocking.
    pub fn try_tick(&self) -> Option<Instant> {
        self.ticks.try_recv().ok()
    }

    /// Wait up to `timeout` for the next tick.
    pub fn wait_tick(&self, timeout: Duration) -> Option<Instant> {
        self.ticks.recv_timeout(timeout).ok()
    }

    /// Drain every pending tick; returns how many were pending.
    pub fn drain(&self) -> usize {
        let mut count = 0;
        while self.ticks.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the thread and wait for it to exit. Idempotent.
    ///
    /// A capture already triggered by a delivered tick is not undone.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            info!("Recovery timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RecoveryTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
