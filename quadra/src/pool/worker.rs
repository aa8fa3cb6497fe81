//! # Worker Thread Module
//!
//! Each worker repeatedly takes one job from the equation channel, solves it
//! and puts the solution on the result channel.
//!
//! ## Key Concepts
//! - Worker loop: get equation, solve, put solution, count
//! - Cancellation: the stop flag is only checked at the top of the loop, so
//!   an equation taken from the channel always makes it to the result side
//! - Panic recovery: a panicking solver aborts the run instead of leaving
//!   the coordinator waiting for a result that will never arrive

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, trace};

use quadra_api::{Equation, Sequence, Solution, Solver, WorkerId};

use crate::pool::channel::BoundedChannel;
use crate::pool::counter::{CompletionCounter, WorkerStats};
use crate::pool::error::{ChannelError, SystemError};

/// Item type of the equation channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Job {
    Solve { sequence: Sequence, equation: Equation },
    /// Poison pill: the worker that takes it exits.
    Stop,
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerExit {
    /// Saw the stop flag at the top of its loop.
    Stopped,
    /// Took a [`Job::Stop`].
    Poisoned,
    /// A channel it was waiting on was closed.
    Closed,
    /// The solver panicked; the run was aborted.
    Panicked,
}

/// The first worker failure of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub worker: WorkerId,
    pub message: String,
}

/// State shared by the coordinator and every worker of one run.
///
/// The two channels, the completion counter and the stop flag are the only
/// mutable state crossing threads.
#[derive(Debug)]
pub struct PoolShared {
    equations: BoundedChannel<Job>,
    results: BoundedChannel<Solution>,
    completed: CompletionCounter,
    stop: AtomicBool,
    failure: Mutex<Option<WorkerFailure>>,
}

impl PoolShared {
    /// Creates both channels with the same fixed capacity.
    pub fn new(capacity: usize) -> Result<Self, ChannelError> {
        Ok(Self {
            equations: BoundedChannel::new(capacity)?,
            results: BoundedChannel::new(capacity)?,
            completed: CompletionCounter::new(),
            stop: AtomicBool::new(false),
            failure: Mutex::new(None),
        })
    }

    pub fn equations(&self) -> &BoundedChannel<Job> {
        &self.equations
    }

    pub fn results(&self) -> &BoundedChannel<Solution> {
        &self.results
    }

    pub fn completed(&self) -> &CompletionCounter {
        &self.completed
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Stops the run: raises the stop flag, closes both channels and releases
    /// completion waiters.
    pub fn cancel(&self) {
        self.request_stop();
        self.equations.close();
        self.results.close();
        self.completed.cancel();
    }

    /// Records `failure` (the first one wins) and cancels the run.
    pub fn abort(&self, failure: WorkerFailure) {
        {
            let mut slot = self.failure.lock();
            if slot.is_none() {
                *slot = Some(failure);
            }
        }
        self.cancel();
    }

    pub fn failure(&self) -> Option<WorkerFailure> {
        self.failure.lock().clone()
    }

    /// Error to report when `what` was closed under the coordinator: the
    /// recorded worker failure if there is one.
    pub fn closed_error(&self, what: &str) -> SystemError {
        match self.failure() {
            Some(WorkerFailure { worker, message }) => {
                SystemError::WorkerPanicked { worker, message }
            }
            None => SystemError::ChannelClosed(what.to_string()),
        }
    }
}

/// One member of the solver pool.
pub struct Worker {
    id: WorkerId,
    shared: Arc<PoolShared>,
    solver: Arc<dyn Solver>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        shared: Arc<PoolShared>,
        solver: Arc<dyn Solver>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            shared,
            solver,
            stats,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Runs the worker on a new named OS thread.
    pub fn spawn(self, name: String) -> Result<JoinHandle<WorkerExit>, SystemError> {
        let id = self.id;
        thread::Builder::new()
            .name(name)
            .spawn(move || self.run())
            .map_err(|e| {
                SystemError::ThreadSetupError(format!("failed to spawn worker {}: {}", id, e))
            })
    }

    /// Processes jobs until stopped; never unwinds.
    pub fn run(&self) -> WorkerExit {
        crate::log_worker!(self.id, "started");

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.process_jobs()));

        match result {
            Ok(exit) => {
                crate::log_worker!(self.id, "stopped", exit = ?exit, processed = self.stats.processed());
                exit
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(worker = self.id, panic = %message, "worker panicked, aborting run");
                self.shared.abort(WorkerFailure {
                    worker: self.id,
                    message,
                });
                WorkerExit::Panicked
            }
        }
    }

    fn process_jobs(&self) -> WorkerExit {
        loop {
            if self.shared.stop_requested() {
                return WorkerExit::Stopped;
            }

            let (sequence, equation) = match self.shared.equations().get() {
                Ok(Job::Solve { sequence, equation }) => (sequence, equation),
                Ok(Job::Stop) => return WorkerExit::Poisoned,
                Err(_) => return WorkerExit::Closed,
            };

            // No cancellation point from here until the solution is stored.
            let started = Instant::now();
            let roots = self.solver.solve(&equation);
            let solution = Solution {
                sequence,
                worker: self.id,
                equation,
                roots,
            };

            if self.shared.results().put(solution).is_err() {
                // Only reachable once the run has been cancelled.
                debug!(worker = self.id, sequence, "result channel closed, discarding solution");
                return WorkerExit::Closed;
            }

            self.stats.record(started.elapsed());
            let total = self.shared.completed().increment();
            trace!(worker = self.id, sequence, total, roots = %roots, "equation solved");
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

