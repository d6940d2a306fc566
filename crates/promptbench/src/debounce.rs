//! Trailing-edge debounce for manifest syncs.
//!
//! Mutations request a sync instead of running one. Each request pushes the deadline
//! out to `now + delay`, so a burst of edits produces a single manifest write once
//! things go quiet. The scheduler owns no timer: the host calls [`SyncScheduler::poll`]
//! with its own clock (an event loop tick, a test) and runs the sync when it returns
//! true. [`SyncScheduler::flush`] is for shutdown, when waiting is not an option.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct SyncScheduler {
    due: Option<Instant>,
}

impl SyncScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a sync `delay` after `now`, replacing any earlier deadline.
    pub fn request(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True exactly once per deadline, when `now` has reached it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Consume a pending request regardless of its deadline.
    pub fn flush(&mut self) -> bool {
        self.due.take().is_some()
    }
}
