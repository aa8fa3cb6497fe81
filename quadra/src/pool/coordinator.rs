//! # Coordinator
//!
//! Owns both channels and the worker pool for one run. It feeds equations
//! into the equation channel, drains solutions from the result channel,
//! waits for the completion barrier and then shuts the pool down.
//!
//! ## Key Concepts
//! - Feed modes: lockstep (put one, get one) or pipelined (scoped feeder thread)
//! - Completion barrier: the run is finished once the completion counter
//!   reaches the requested number of equations
//! - Shutdown: stop flag plus channel close, or one poison pill per worker
//!
//! ## State Machine
//! `Idle -> Producing -> Draining -> ShuttingDown -> Done`, with `Failed`
//! entered on a worker panic, a timeout or an exhausted source. Both `Done`
//! and `Failed` are only reached after every launched worker was joined.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::anyhow;
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

use quadra_api::{
    CoefficientSource, QuadraticSolver, Solution, Solver, UniformSource, WorkerId,
};

use crate::pool::config::{FeedMode, ShutdownStrategy, SolverSystemConfig};
use crate::pool::counter::{WaitOutcome, WorkerStats};
use crate::pool::error::{ChannelError, SystemError};
use crate::pool::worker::{Job, PoolShared, Worker, WorkerExit};
use crate::report::{RunReport, WorkerReport};

/// Lifecycle of a [`Coordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Producing,
    Draining,
    ShuttingDown,
    Done,
    Failed,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinatorState::Idle => "idle",
            CoordinatorState::Producing => "producing",
            CoordinatorState::Draining => "draining",
            CoordinatorState::ShuttingDown => "shutting_down",
            CoordinatorState::Done => "done",
            CoordinatorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

type WorkerHandle = (WorkerId, JoinHandle<WorkerExit>);

/// Drives a single solver run.
///
/// A coordinator runs once; a second call to [`run`](Self::run) or
/// [`run_with`](Self::run_with) fails with [`SystemError::InvalidState`].
pub struct Coordinator {
    config: SolverSystemConfig,
    solver: Arc<dyn Solver>,
    state: CoordinatorState,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

impl Coordinator {
    /// Creates a coordinator using [`QuadraticSolver`].
    pub fn new(config: SolverSystemConfig) -> Result<Self, SystemError> {
        Self::with_solver(config, Arc::new(QuadraticSolver))
    }

    /// Creates a coordinator with a custom solver.
    pub fn with_solver(
        config: SolverSystemConfig,
        solver: Arc<dyn Solver>,
    ) -> Result<Self, SystemError> {
        config.validate()?;
        Ok(Self {
            config,
            solver,
            state: CoordinatorState::Idle,
        })
    }

    pub fn config(&self) -> &SolverSystemConfig {
        &self.config
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Runs the configured workload with uniformly random coefficients.
    pub fn run(&mut self) -> Result<RunReport, SystemError> {
        self.run_observed(|_| {})
    }

    /// Like [`run`](Self::run), calling `observer` for every drained solution
    /// as soon as it is drained.
    pub fn run_observed<F>(&mut self, observer: F) -> Result<RunReport, SystemError>
    where
        F: FnMut(&Solution),
    {
        let (low, high) = self.config.coefficient_range;
        let mut source = match self.config.seed {
            Some(seed) => UniformSource::with_seed(seed, low, high)?,
            None => UniformSource::new(low, high)?,
        };
        self.run_with(&mut source, observer)
    }

    /// Runs the configured workload with equations from `source`, calling
    /// `observer` on the coordinator thread for every drained solution.
    pub fn run_with<S, F>(&mut self, source: &mut S, mut observer: F) -> Result<RunReport, SystemError>
    where
        S: CoefficientSource + ?Sized,
        F: FnMut(&Solution),
    {
        if self.state != CoordinatorState::Idle {
            return Err(SystemError::InvalidState(self.state.to_string()));
        }

        let total = self.config.total_equations();
        let run_id = Uuid::new_v4();
        let span = crate::run_span!(
            run_id,
            total,
            workers = self.config.worker_count,
            capacity = self.config.channel_capacity
        );
        let _enter = span.enter();

        info!(feed_mode = ?self.config.feed_mode, shutdown = ?self.config.shutdown_strategy, "starting run");
        let started = Instant::now();

        let shared = Arc::new(PoolShared::new(self.config.channel_capacity)?);
        let stats: Vec<Arc<WorkerStats>> = (0..self.config.worker_count)
            .map(|_| Arc::new(WorkerStats::new()))
            .collect();

        let handles = match self.spawn_workers(&shared, &stats) {
            Ok(handles) => handles,
            Err(e) => {
                self.state = CoordinatorState::Failed;
                return Err(e);
            }
        };

        let collect = self.config.collect_solutions;
        let mut solutions = Vec::new();
        let mut on_solution = |solution: Solution| {
            observer(&solution);
            if collect {
                solutions.push(solution);
            }
        };

        self.state = CoordinatorState::Producing;
        let fed = match self.config.feed_mode {
            FeedMode::Lockstep => self.feed_lockstep(&shared, source, total, &mut on_solution),
            FeedMode::Pipelined => self.feed_pipelined(&shared, source, total, &mut on_solution),
        };
        let outcome = fed.and_then(|()| {
            self.state = CoordinatorState::Draining;
            self.await_completion(&shared, total)
        });
        let elapsed = started.elapsed();

        self.state = CoordinatorState::ShuttingDown;
        let exits = self.shutdown_workers(&shared, handles, outcome.is_ok());

        let outcome = match (outcome, shared.failure()) {
            (Err(e), _) => Err(e),
            (Ok(()), Some(failure)) => Err(SystemError::WorkerPanicked {
                worker: failure.worker,
                message: failure.message,
            }),
            (Ok(()), None) => Ok(()),
        };
        if let Err(e) = outcome {
            self.state = CoordinatorState::Failed;
            error!(error = %e, "run failed");
            return Err(e);
        }

        self.state = CoordinatorState::Done;
        let report = RunReport {
            run_id: run_id.to_string(),
            total_equations: total,
            total_solved: shared.completed().get(),
            elapsed,
            detail: self.config.report_detail(),
            equation_channel_peak: shared.equations().peak_occupancy(),
            result_channel_peak: shared.results().peak_occupancy(),
            workers: stats
                .iter()
                .zip(exits)
                .enumerate()
                .map(|(worker, (stats, exit))| WorkerReport::from_stats(worker, stats, exit))
                .collect(),
            solutions,
        };
        info!(
            solved = report.total_solved,
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "all equations solved"
        );
        Ok(report)
    }

    fn spawn_workers(
        &self,
        shared: &Arc<PoolShared>,
        stats: &[Arc<WorkerStats>],
    ) -> Result<Vec<WorkerHandle>, SystemError> {
        let mut handles = Vec::with_capacity(stats.len());
        for (id, worker_stats) in stats.iter().enumerate() {
            let worker = Worker::new(
                id,
                Arc::clone(shared),
                Arc::clone(&self.solver),
                Arc::clone(worker_stats),
            );
            let name = format!("{}-{}", self.config.thread_name_prefix, id);
            match worker.spawn(name) {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    error!(worker = id, error = %e, "failed to launch worker pool");
                    shared.cancel();
                    join_all(handles);
                    return Err(e);
                }
            }
        }
        debug!(count = handles.len(), "worker pool launched");
        Ok(handles)
    }

    /// Submits one equation and drains one solution at a time.
    fn feed_lockstep<S>(
        &self,
        shared: &PoolShared,
        source: &mut S,
        total: u64,
        on_solution: &mut dyn FnMut(Solution),
    ) -> Result<(), SystemError>
    where
        S: CoefficientSource + ?Sized,
    {
        for sequence in 0..total {
            let equation = source
                .next_equation()
                .ok_or(SystemError::SourceExhausted {
                    produced: sequence,
                    expected: total,
                })?;
            shared
                .equations()
                .put(Job::Solve { sequence, equation })
                .map_err(|_| shared.closed_error("equation channel"))?;

            let solution = self.receive(shared)?;
            on_solution(solution);
        }
        Ok(())
    }

    /// Submits from a scoped feeder thread while this thread drains.
    fn feed_pipelined<S>(
        &self,
        shared: &PoolShared,
        source: &mut S,
        total: u64,
        on_solution: &mut dyn FnMut(Solution),
    ) -> Result<(), SystemError>
    where
        S: CoefficientSource + ?Sized,
    {
        let span = Span::current();
        thread::scope(|scope| -> Result<(), SystemError> {
            let feeder = thread::Builder::new()
                .name(format!("{}-feeder", self.config.thread_name_prefix))
                .spawn_scoped(scope, move || {
                    let _enter = span.enter();
                    feed_all(shared, source, total)
                })
                .map_err(|e| {
                    shared.cancel();
                    SystemError::ThreadSetupError(format!("failed to spawn feeder: {}", e))
                })?;

            let mut drained = Ok(());
            for _ in 0..total {
                match self.receive(shared) {
                    Ok(solution) => on_solution(solution),
                    Err(e) => {
                        shared.cancel();
                        drained = Err(e);
                        break;
                    }
                }
            }

            let fed = feeder
                .join()
                .unwrap_or_else(|_| Err(SystemError::Other(anyhow!("feeder thread panicked"))));
            // An exhausted source explains why the drain came up short.
            fed.and(drained)
        })
    }

    fn receive(&self, shared: &PoolShared) -> Result<Solution, SystemError> {
        let received = match self.config.drain_timeout {
            Some(timeout) => shared.results().get_timeout(timeout),
            None => shared.results().get(),
        };
        received.map_err(|e| match e {
            ChannelError::Timeout(after) => {
                SystemError::Timeout(format!("no solution arrived within {:?}", after))
            }
            _ => shared.closed_error("result channel"),
        })
    }

    fn await_completion(&self, shared: &PoolShared, total: u64) -> Result<(), SystemError> {
        let counter = shared.completed();
        let outcome = match self.config.drain_timeout {
            Some(timeout) => counter.wait_for_timeout(total, timeout),
            None => counter.wait_for(total),
        };
        match outcome {
            WaitOutcome::Reached => Ok(()),
            WaitOutcome::Cancelled => Err(shared.closed_error("run cancelled before completion")),
            WaitOutcome::TimedOut => Err(SystemError::Timeout(format!(
                "{} of {} equations completed",
                counter.get(),
                total
            ))),
        }
    }

    /// Wakes every worker, joins them and closes both channels.
    ///
    /// `graceful` selects the configured strategy; otherwise the run is
    /// cancelled outright.
    fn shutdown_workers(
        &self,
        shared: &PoolShared,
        handles: Vec<WorkerHandle>,
        graceful: bool,
    ) -> Vec<WorkerExit> {
        if !graceful {
            shared.cancel();
        } else {
            match self.config.shutdown_strategy {
                ShutdownStrategy::CloseChannels => {
                    shared.request_stop();
                    shared.equations().close();
                }
                // The stop flag stays down: a worker leaving on the flag
                // would never take its pill and the last put could block.
                ShutdownStrategy::PoisonPill => {
                    for _ in 0..handles.len() {
                        if shared.equations().put(Job::Stop).is_err() {
                            warn!("equation channel closed while sending stop jobs");
                            break;
                        }
                    }
                }
            }
        }

        let exits = join_all(handles);
        shared.equations().close();
        shared.results().close();
        debug!(workers = exits.len(), "worker pool joined");
        exits
    }
}

fn feed_all<S>(shared: &PoolShared, source: &mut S, total: u64) -> Result<(), SystemError>
where
    S: CoefficientSource + ?Sized,
{
    for sequence in 0..total {
        let Some(equation) = source.next_equation() else {
            // Close the result side once everything submitted is solved so
            // the drain stops instead of waiting for equations never sent.
            if shared.completed().wait_for(sequence) == WaitOutcome::Reached {
                shared.results().close();
            }
            return Err(SystemError::SourceExhausted {
                produced: sequence,
                expected: total,
            });
        };
        if shared.equations().put(Job::Solve { sequence, equation }).is_err() {
            debug!(sequence, "feeder stopped, equation channel closed");
            return Ok(());
        }
    }
    Ok(())
}

fn join_all(handles: Vec<WorkerHandle>) -> Vec<WorkerExit> {
    handles
        .into_iter()
        .map(|(worker, handle)| match handle.join() {
            Ok(exit) => exit,
            Err(_) => {
                error!(worker, "worker thread panicked outside the solver");
                WorkerExit::Panicked
            }
        })
        .collect()
}
