//! # Equation Error Types
//!
//! Errors raised while building equations or configuring coefficient sources.
//! These never cross into the worker loop: invalid input is rejected before an
//! equation is handed to the solver pool.
//!
//! ## Usage Example
//!
//! ```rust
//! use quadra_api::{Equation, EquationError};
//!
//! match Equation::new(0.0, 1.0, 2.0) {
//!     Err(EquationError::Degenerate { .. }) => println!("not a quadratic"),
//!     Err(other) => println!("rejected: {}", other),
//!     Ok(eq) => println!("accepted: {}", eq),
//! }
//! ```

use thiserror::Error;

/// Errors produced when constructing equations or coefficient sources.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquationError {
    /// The leading coefficient is zero, so the equation is not quadratic.
    ///
    /// The root formula divides by `2a`; such equations are rejected instead
    /// of producing an undefined result.
    #[error("Degenerate equation: leading coefficient is zero (b = {b}, c = {c})")]
    Degenerate { b: f64, c: f64 },

    /// At least one coefficient is NaN or infinite.
    #[error("Non-finite coefficients: a = {a}, b = {b}, c = {c}")]
    NonFinite { a: f64, b: f64, c: f64 },

    /// The coefficient range is empty or not finite.
    #[error("Invalid coefficient range [{low}, {high})")]
    InvalidRange { low: f64, high: f64 },
}
