//! # Coefficient Sources
//!
//! Producers of work for the coordinator. A source yields one equation per
//! call; it owns its own randomness and shares nothing with the pool.

use std::collections::VecDeque;

use crate::equation::Equation;
use crate::errors::EquationError;

/// Default lower bound (inclusive) for generated coefficients.
pub const DEFAULT_COEFFICIENT_LOW: f64 = -5.0;
/// Default upper bound (exclusive) for generated coefficients.
pub const DEFAULT_COEFFICIENT_HIGH: f64 = 5.0;

/// Supplies equations to the coordinator's producer loop.
///
/// Returns `None` once the source is exhausted. Infinite sources never do.
pub trait CoefficientSource: Send {
    fn next_equation(&mut self) -> Option<Equation>;
}

/// Uniformly distributed coefficients in `[low, high)`.
///
/// Draws with `a == 0` are discarded and redrawn so every produced
/// equation is a valid quadratic.
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: fastrand::Rng,
    low: f64,
    high: f64,
}

impl UniformSource {
    /// Creates a source seeded from the OS.
    pub fn new(low: f64, high: f64) -> Result<Self, EquationError> {
        Self::with_rng(fastrand::Rng::new(), low, high)
    }

    /// Creates a deterministic source; the same seed yields the same sequence.
    pub fn with_seed(seed: u64, low: f64, high: f64) -> Result<Self, EquationError> {
        Self::with_rng(fastrand::Rng::with_seed(seed), low, high)
    }

    fn with_rng(rng: fastrand::Rng, low: f64, high: f64) -> Result<Self, EquationError> {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(EquationError::InvalidRange { low, high });
        }
        Ok(Self { rng, low, high })
    }

    pub fn range(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    fn coefficient(&mut self) -> f64 {
        self.low + self.rng.f64() * (self.high - self.low)
    }
}

impl Default for UniformSource {
    fn default() -> Self {
        Self {
            rng: fastrand::Rng::new(),
            low: DEFAULT_COEFFICIENT_LOW,
            high: DEFAULT_COEFFICIENT_HIGH,
        }
    }
}

impl CoefficientSource for UniformSource {
    fn next_equation(&mut self) -> Option<Equation> {
        loop {
            let a = self.coefficient();
            let b = self.coefficient();
            let c = self.coefficient();
            if let Ok(equation) = Equation::new(a, b, c) {
                return Some(equation);
            }
        }
    }
}

/// Replays a fixed list of equations in order, then reports exhaustion.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    equations: VecDeque<Equation>,
}

impl FixedSource {
    pub fn new(equations: impl IntoIterator<Item = Equation>) -> Self {
        Self {
            equations: equations.into_iter().collect(),
        }
    }

    /// Builds a source from raw coefficient triples.
    pub fn from_coefficients(
        triples: impl IntoIterator<Item = (f64, f64, f64)>,
    ) -> Result<Self, EquationError> {
        let equations = triples
            .into_iter()
            .map(|(a, b, c)| Equation::new(a, b, c))
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(Self { equations })
    }

    pub fn remaining(&self) -> usize {
        self.equations.len()
    }
}

impl CoefficientSource for FixedSource {
    fn next_equation(&mut self) -> Option<Equation> {
        self.equations.pop_front()
    }
}
