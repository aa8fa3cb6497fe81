use serde::Serialize;

use crate::equation::{Equation, Roots};

/// Index of a worker inside its pool, `0..worker_count`.
pub type WorkerId = usize;

/// Position of an equation in the producer's submission order, starting at 0.
pub type Sequence = u64;

/// A computed result together with the equation it came from.
///
/// This is the item type of the result channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Solution {
    pub sequence: Sequence,
    pub worker: WorkerId,
    pub equation: Equation,
    pub roots: Roots,
}
