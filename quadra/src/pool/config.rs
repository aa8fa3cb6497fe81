use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use quadra_api::source::{DEFAULT_COEFFICIENT_HIGH, DEFAULT_COEFFICIENT_LOW};

use crate::pool::error::SystemError;

pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;
pub const SMALL_WORKLOAD_EQUATIONS: u64 = 30;
pub const LARGE_WORKLOAD_EQUATIONS: u64 = 3000;
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "quadra-worker";

/// Runs at or below this size report every root instead of worker statistics.
pub const ROOTS_REPORT_LIMIT: u64 = SMALL_WORKLOAD_EQUATIONS;

// --- Configuration Enums ---

/// How many equations a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Workload {
    /// 30 equations, every root is reported.
    #[default]
    Small,
    /// 3000 equations, per-worker statistics are reported.
    Large,
    /// An explicit equation count.
    Custom(u64),
}

impl Workload {
    pub fn equations(&self) -> u64 {
        match self {
            Workload::Small => SMALL_WORKLOAD_EQUATIONS,
            Workload::Large => LARGE_WORKLOAD_EQUATIONS,
            Workload::Custom(count) => *count,
        }
    }

    /// Maps an interactive menu entry ("1" or "2") to a preset.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Workload::Small),
            "2" => Some(Workload::Large),
            _ => None,
        }
    }

    pub fn report_detail(&self) -> ReportDetail {
        if self.equations() <= ROOTS_REPORT_LIMIT {
            ReportDetail::Roots
        } else {
            ReportDetail::WorkerStats
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workload::Small => write!(f, "small ({} equations)", SMALL_WORKLOAD_EQUATIONS),
            Workload::Large => write!(f, "large ({} equations)", LARGE_WORKLOAD_EQUATIONS),
            Workload::Custom(count) => write!(f, "custom ({} equations)", count),
        }
    }
}

impl FromStr for Workload {
    type Err = String;

    /// Accepts `small`, `large` or a positive equation count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Workload::Small),
            "large" => Ok(Workload::Large),
            other => match other.parse::<u64>() {
                Ok(0) => Err("equation count must be at least 1".to_string()),
                Ok(count) => Ok(Workload::Custom(count)),
                Err(_) => Err(format!(
                    "invalid workload '{}': expected small, large or an equation count",
                    s
                )),
            },
        }
    }
}

/// How the producer loop interleaves submitting equations and draining results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FeedMode {
    /// Submit one equation, then drain one result, repeat.
    Lockstep,
    /// A feeder thread submits while the coordinator drains concurrently.
    Pipelined,
}

/// How workers blocked on the equation channel are woken at shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ShutdownStrategy {
    /// Set the stop flag and close the equation channel, waking every waiter.
    CloseChannels,
    /// Enqueue one stop job per worker; each worker exits after taking one.
    PoisonPill,
}

/// What the reporter shows after a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ReportDetail {
    /// Every observed root.
    Roots,
    /// Per-worker counts and average processing time.
    WorkerStats,
}

// --- System Configuration ---

/// Configuration for one solver run.
#[derive(Clone, Debug, Serialize)]
pub struct SolverSystemConfig {
    /// Number of worker threads in the pool.
    pub worker_count: usize,

    /// Capacity shared by the equation and result channels.
    pub channel_capacity: usize,

    /// Number of equations to produce.
    pub workload: Workload,

    pub feed_mode: FeedMode,

    pub shutdown_strategy: ShutdownStrategy,

    /// Coefficients are drawn from `[low, high)`.
    pub coefficient_range: (f64, f64),

    /// Seed for reproducible coefficient streams; `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Keep every drained solution in the run report.
    pub collect_solutions: bool,

    /// Upper bound on each wait for a result and on the completion wait.
    /// `None` waits forever.
    pub drain_timeout: Option<Duration>,

    pub thread_name_prefix: String,
}

impl Default for SolverSystemConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            workload: Workload::Small,
            feed_mode: FeedMode::Lockstep,
            shutdown_strategy: ShutdownStrategy::CloseChannels,
            coefficient_range: (DEFAULT_COEFFICIENT_LOW, DEFAULT_COEFFICIENT_HIGH),
            seed: None,
            collect_solutions: true,
            drain_timeout: None,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl SolverSystemConfig {
    /// Default configuration for a workload; solutions are only kept when
    /// the report will list them.
    pub fn for_workload(workload: Workload) -> Self {
        Self {
            workload,
            collect_solutions: workload.report_detail() == ReportDetail::Roots,
            ..Self::default()
        }
    }

    /// Sizes the pool to the number of logical CPUs.
    pub fn with_available_parallelism(mut self) -> Self {
        self.worker_count = num_cpus::get().max(1);
        self
    }

    pub fn total_equations(&self) -> u64 {
        self.workload.equations()
    }

    pub fn report_detail(&self) -> ReportDetail {
        self.workload.report_detail()
    }

    /// Rejects configurations the pool cannot run.
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.worker_count == 0 {
            return Err(SystemError::ConfigError(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(SystemError::ConfigError(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.total_equations() == 0 {
            return Err(SystemError::ConfigError(
                "workload must contain at least one equation".to_string(),
            ));
        }
        let (low, high) = self.coefficient_range;
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(SystemError::ConfigError(format!(
                "coefficient range [{}, {}) is empty or not finite",
                low, high
            )));
        }
        if self.drain_timeout == Some(Duration::ZERO) {
            return Err(SystemError::ConfigError(
                "drain_timeout must be non-zero when set".to_string(),
            ));
        }
        Ok(())
    }
}
