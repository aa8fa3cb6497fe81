//! Completion tracking shared between workers and the coordinator.
//!
//! [`CompletionCounter`] counts equations that made the full round trip and
//! lets the coordinator block until a target count is reached. It counts
//! once per completed equation, not once per worker.
//! [`WorkerStats`] holds one worker's personal tally.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Result of waiting on a [`CompletionCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The counter reached the target.
    Reached,
    /// The counter was cancelled before reaching the target.
    Cancelled,
    /// The timeout elapsed first.
    TimedOut,
}

/// Monotonic count of fully processed items with a blocking wait.
///
/// Reads never block. Waiters are woken on every increment and on cancel.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    completed: AtomicU64,
    cancelled: AtomicBool,
    trigger: Mutex<()>,
    changed: Condvar,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed item and returns the new total.
    pub fn increment(&self) -> u64 {
        let total = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        let _guard = self.trigger.lock();
        self.changed.notify_all();
        total
    }

    /// Current total without blocking.
    pub fn get(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Releases every current and future waiter with [`WaitOutcome::Cancelled`]
    /// unless its target is already met.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        let _guard = self.trigger.lock();
        self.changed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Blocks until the count is at least `target` or the counter is cancelled.
    pub fn wait_for(&self, target: u64) -> WaitOutcome {
        let mut guard = self.trigger.lock();
        loop {
            if self.get() >= target {
                return WaitOutcome::Reached;
            }
            if self.is_cancelled() {
                return WaitOutcome::Cancelled;
            }
            self.changed.wait(&mut guard);
        }
    }

    /// Like [`wait_for`](Self::wait_for) but gives up after `timeout`.
    pub fn wait_for_timeout(&self, target: u64, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        let mut expired = false;
        let mut guard = self.trigger.lock();
        loop {
            if self.get() >= target {
                return WaitOutcome::Reached;
            }
            if self.is_cancelled() {
                return WaitOutcome::Cancelled;
            }
            if expired {
                return WaitOutcome::TimedOut;
            }
            expired = self.changed.wait_until(&mut guard, deadline).timed_out();
        }
    }
}

/// Per-worker tally: equations processed and time spent processing them.
///
/// Written only by its own worker, read by the coordinator after shutdown.
#[derive(Debug, Default)]
pub struct WorkerStats {
    processed: AtomicU64,
    busy_nanos: AtomicU64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one processed equation that took `elapsed`.
    pub fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.busy_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Release);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    pub fn busy(&self) -> Duration {
        Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed))
    }

    /// Mean processing time per equation; zero when nothing was processed.
    pub fn average(&self) -> Duration {
        match self.processed() {
            0 => Duration::ZERO,
            count => Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed) / count),
        }
    }
}
