//! # numeric_approx
//!
//! Iterative approximation of `f(x) = y` for arbitrary-precision functions.
//!
//! This crate provides:
//! - The problem description and result types (`solvers`)
//! - Bisection, Newton-Raphson and a chained two-stage strategy
//! - Bracket construction and geometric expansion
//! - Approximation errors carrying the best estimate reached (`error`)
//!
//! ## Architecture Position
//!
//! Approximation layer (L2). Depends only on `numeric_core`; distributions
//! in `numeric_models` solve their inverses through it.
//!
//! ## Example
//!
//! ```rust
//! use numeric_approx::prelude::*;
//! use numeric_core::math::elementary;
//! use numeric_core::traits::{Bounded, FnMathFunction, Monotonicity};
//! use numeric_core::types::{Decimal, MathContext};
//!
//! // ln(x) = 1 on [1, 4] is Euler's number
//! let ln = Bounded::new(
//!     FnMathFunction::new(
//!         |ctx: &MathContext, x: &Decimal| {
//!             elementary::ln(x, ctx).map_err(ApproximationError::from)
//!         },
//!         Monotonicity::Increasing,
//!     ),
//!     Some(Decimal::one()),
//!     Some(Decimal::from(4)),
//! );
//! let problem = ApproximationProblem::new(&ln, Decimal::one());
//! let result = Bisection::new()
//!     .approximate(&problem, &MathContext::DECIMAL64)
//!     .unwrap();
//! assert_eq!(result.value.to_string(), "2.718281828459045");
//! ```

pub mod error;
pub mod solvers;

pub use error::ApproximationError;
pub use solvers::{
    ApproximationProblem, ApproximationResult, ApproximationStrategy, Bisection, Bracket,
    ChainedApproximation, ChainedConfig, NewtonRaphson, DEFAULT_MAX_ITERATIONS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::ApproximationError;
    pub use crate::solvers::{
        ApproximationProblem, ApproximationResult, ApproximationStrategy, Bisection, Bracket,
        ChainedApproximation, ChainedConfig, NewtonRaphson,
    };
}
