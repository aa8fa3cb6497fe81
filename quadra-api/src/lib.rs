//! # Quadra API
//!
//! Value types and collaborator traits shared by the quadra solver pool.
//!
//! The pool itself (bounded channels, workers, coordinator) lives in the
//! `quadra` crate. This crate only defines what flows through it and the
//! narrow interfaces it calls:
//!
//! - **Equations**: immutable coefficient triples, validated on construction
//! - **Roots**: the complex value computed for one equation
//! - **Solver**: the pure arithmetic collaborator
//! - **Coefficient sources**: producers of equations (random or fixed)
//!
//! ## Usage Example
//!
//! ```rust
//! use quadra_api::{CoefficientSource, QuadraticSolver, Solver, UniformSource};
//!
//! let mut source = UniformSource::with_seed(7, -5.0, 5.0).unwrap();
//! let equation = source.next_equation().unwrap();
//! let roots = QuadraticSolver.solve(&equation);
//! println!("{} -> {}", equation, roots);
//! ```
//!
//! ## Module Organization
//!
//! - [`equation`]: `Equation`, `Roots` and `RootKind`
//! - [`solver`]: the `Solver` trait and the quadratic formula
//! - [`source`]: the `CoefficientSource` trait and its implementations
//! - [`errors`]: validation errors
//! - [`types`]: the result-channel envelope and id aliases

pub mod equation;
pub mod errors;
pub mod solver;
pub mod source;
pub mod types;

pub use equation::{Equation, RootKind, Roots};
pub use errors::EquationError;
pub use solver::{QuadraticSolver, Solver};
pub use source::{CoefficientSource, FixedSource, UniformSource};
pub use types::{Sequence, Solution, WorkerId};
