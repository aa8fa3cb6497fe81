//! # Equations and Roots
//!
//! Immutable value types that flow through the solver pool. An [`Equation`]
//! is created by the producer, consumed by exactly one worker and never
//! mutated. [`Roots`] is the complex value a worker computes for it.

use std::fmt;

use serde::Serialize;

use crate::errors::EquationError;

/// A quadratic equation `ax² + bx + c = 0` with a non-zero leading coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Equation {
    a: f64,
    b: f64,
    c: f64,
}

impl Equation {
    /// Creates an equation, rejecting non-finite coefficients and `a == 0`.
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self, EquationError> {
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(EquationError::NonFinite { a, b, c });
        }
        if a == 0.0 {
            return Err(EquationError::Degenerate { b, c });
        }
        Ok(Self { a, b, c })
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Returns `(a, b, c)`.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    /// The discriminant `b² - 4ac`.
    pub fn discriminant(&self) -> f64 {
        self.b * self.b - 4.0 * self.a * self.c
    }

    /// Classifies the roots by the sign of the discriminant.
    pub fn root_kind(&self) -> RootKind {
        RootKind::from_discriminant(self.discriminant())
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x^2 + {}x + {} = 0", self.a, self.b, self.c)
    }
}

/// Shape of the root pair, decided by the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RootKind {
    /// Two distinct real roots (discriminant > 0).
    Distinct,
    /// One repeated real root (discriminant == 0).
    Repeated,
    /// A complex conjugate pair (discriminant < 0).
    Complex,
}

impl RootKind {
    pub fn from_discriminant(discriminant: f64) -> Self {
        if discriminant > 0.0 {
            RootKind::Distinct
        } else if discriminant == 0.0 {
            RootKind::Repeated
        } else {
            RootKind::Complex
        }
    }
}

/// A complex value `real + imag·i`.
///
/// For real roots the imaginary part is zero and `real` holds the larger
/// root (`(-b + √d) / 2a`); for complex roots this is one member of the
/// conjugate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Roots {
    pub real: f64,
    pub imag: f64,
}

impl Roots {
    pub fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }

    pub fn is_real(&self) -> bool {
        self.imag == 0.0
    }

    /// The conjugate member of the pair.
    pub fn conjugate(&self) -> Self {
        Self { real: self.real, imag: -self.imag }
    }
}

impl fmt::Display for Roots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}i", self.real, self.imag)
    }
}
