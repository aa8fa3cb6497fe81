// Quadra solver pool
//
// A producer and a fixed pool of worker threads exchange quadratic equations
// and their roots through two bounded blocking channels.

pub mod logging;
pub mod pool;
pub mod prompt;
pub mod report;

// Re-export commonly used types
pub use pool::{
    BoundedChannel, Coordinator, CoordinatorState, FeedMode, ShutdownStrategy, SolverSystemConfig,
    SystemError, Workload,
};
pub use report::{ConsoleReporter, JsonReporter, Reporter, RunReport, WorkerReport};
