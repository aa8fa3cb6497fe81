use std::fmt;
use std::time::Duration;

use thiserror::Error;

use quadra_api::{EquationError, WorkerId};

/// Errors returned by [`BoundedChannel`](crate::pool::channel::BoundedChannel) reads
/// and construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel capacity must be at least 1")]
    ZeroCapacity,
    #[error("Channel is closed")]
    Closed,
    #[error("Channel is empty")]
    Empty,
    #[error("Channel operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors returned by channel writes. The rejected item is always handed back.
#[derive(Error)]
pub enum PutError<T> {
    #[error("Channel is closed")]
    Closed(T),
    #[error("Channel is full")]
    Full(T),
    #[error("Channel put timed out after {1:?}")]
    Timeout(T, Duration),
}

impl<T> PutError<T> {
    /// Recovers the item that could not be stored.
    pub fn into_inner(self) -> T {
        match self {
            PutError::Closed(item) | PutError::Full(item) | PutError::Timeout(item, _) => item,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, PutError::Closed(_))
    }
}

// Manual impl so items without Debug can still travel through a channel.
impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutError::Closed(_) => f.write_str("Closed(..)"),
            PutError::Full(_) => f.write_str("Full(..)"),
            PutError::Timeout(_, after) => write!(f, "Timeout(.., {:?})", after),
        }
    }
}

/// Errors related to running the solver pool.
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Thread setup error: {0}")]
    ThreadSetupError(String),
    #[error("Coordinator cannot run from state {0}")]
    InvalidState(String),
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked { worker: WorkerId, message: String },
    #[error("Channel closed unexpectedly: {0}")]
    ChannelClosed(String),
    #[error("Coefficient source exhausted after {produced} of {expected} equations")]
    SourceExhausted { produced: u64, expected: u64 },
    #[error("Operation timed out: {0}")]
    Timeout(String),
    #[error("Invalid equation: {0}")]
    Equation(#[from] EquationError),
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("Internal system error: {0}")]
    Other(#[from] anyhow::Error),
}
