//! Flush timer state
//!
//! The timer guarantees a non-empty queue is flushed within `time_limit`
//! even if `size_limit` is never reached.
//!
//! ```text
//!   Idle --(first enqueue since last flush)--> Armed
//!   Armed --(timer fires | size flush | manual flush)--> Idle
//! ```
//!
//! The timer itself is a spawned Tokio task; this type only tracks its abort
//! handle and a flush epoch. Every flush advances the epoch. A timer task
//! that wakes up after a different flush already happened sees a stale epoch
//! and does nothing, which closes the window between `abort()` and the task
//! actually stopping.

use tokio::task::AbortHandle;

#[derive(Debug, Default)]
pub(crate) struct FlushTimer {
    epoch: u64,
    armed: Option<AbortHandle>,
}

impl FlushTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether a live timer task is pending
    ///
    /// A task whose runtime shut down is finished, not armed; the next
    /// enqueue must schedule a replacement.
    pub(crate) fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Epoch a newly spawned timer task must carry
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Record the task scheduled for the current epoch
    pub(crate) fn arm(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.armed.replace(handle) {
            previous.abort();
        }
    }

    /// Whether a timer task started at `epoch` may still flush
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.armed.is_some() && self.epoch == epoch
    }

    /// Cancel the armed timer (if any) because a flush is happening now
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// The armed timer fired; forget its handle without aborting it
    pub(crate) fn expire(&mut self) {
        self.armed = None;
        self.epoch = self.epoch.wrapping_add(1);
    }
}
