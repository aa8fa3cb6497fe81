//! # Solver Interface
//!
//! The arithmetic collaborator called by every worker. Implementations must
//! be pure and thread-safe: a single solver instance is shared by the whole
//! pool.
//!
//! ## Usage Example
//!
//! ```rust
//! use quadra_api::{Equation, QuadraticSolver, Solver};
//!
//! let eq = Equation::new(1.0, -3.0, 2.0).unwrap();
//! let roots = QuadraticSolver.solve(&eq);
//! assert_eq!(roots.real, 2.0);
//! ```

use crate::equation::{Equation, Roots};

/// Computes the roots of one equation.
///
/// Closures of the shape `Fn(&Equation) -> Roots` are solvers too, which is
/// handy for instrumenting the pool in tests.
pub trait Solver: Send + Sync {
    fn solve(&self, equation: &Equation) -> Roots;
}

impl<F> Solver for F
where
    F: Fn(&Equation) -> Roots + Send + Sync,
{
    fn solve(&self, equation: &Equation) -> Roots {
        self(equation)
    }
}

/// The textbook quadratic formula.
///
/// - discriminant > 0: `((-b + √d) / 2a, 0)`
/// - discriminant = 0: `(-b / 2a, 0)`
/// - discriminant < 0: `(-b / 2a, √(-d) / 2a)`
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadraticSolver;

impl Solver for QuadraticSolver {
    fn solve(&self, equation: &Equation) -> Roots {
        let (a, b, _) = equation.coefficients();
        let determinant = equation.discriminant();
        let two_a = 2.0 * a;

        if determinant > 0.0 {
            Roots::new(unsigned_zero((-b + determinant.sqrt()) / two_a), 0.0)
        } else if determinant == 0.0 {
            Roots::new(unsigned_zero(-b / two_a), 0.0)
        } else {
            Roots::new(unsigned_zero(-b / two_a), (-determinant).sqrt() / two_a)
        }
    }
}

// -0.0 + 0.0 is +0.0; keeps "-0 + 1i" out of reports.
fn unsigned_zero(value: f64) -> f64 {
    value + 0.0
}
