#![doc = " Bounded-buffer worker pool: channels, counters, workers and the coordinator."]

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod counter;
pub mod error;
pub mod worker;

// Re-export key types for easier usage
pub use channel::BoundedChannel;
pub use config::{FeedMode, ReportDetail, ShutdownStrategy, SolverSystemConfig, Workload};
pub use coordinator::{Coordinator, CoordinatorState};
pub use counter::{CompletionCounter, WaitOutcome, WorkerStats};
pub use error::{ChannelError, PutError, SystemError};
pub use worker::{Job, PoolShared, Worker, WorkerExit, WorkerFailure};
