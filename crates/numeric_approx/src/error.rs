//! Approximation errors.

use numeric_core::types::{Decimal, NumericError};
use thiserror::Error;

/// Errors that can occur while approximating a solution of `f(x) = y`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApproximationError {
    /// Iteration budget exhausted
    #[error("Failed to converge after {iterations} iterations (best estimate: {best_estimate})")]
    NonConvergence {
        best_estimate: Decimal,
        iterations: usize,
    },

    /// Newton step impossible
    #[error("Derivative vanished at {at} after {iterations} iterations")]
    VanishingDerivative { at: Decimal, iterations: usize },

    /// Bracket does not enclose a sign change
    #[error("Invalid bracket [{lower}, {upper}]: no sign change of the residual")]
    InvalidBracket { lower: Decimal, upper: Decimal },

    /// No bracket given and the function domain is unbounded
    #[error("Cannot build a bracket: the function domain is unbounded")]
    UnboundedDomain,

    /// Derivative-based strategy used without a derivative
    #[error("Strategy requires a derivative but none was supplied")]
    MissingDerivative,

    /// No start value, bracket or bounded domain to start from
    #[error("No start value, bracket or bounded domain to start from")]
    MissingStart,

    /// Arithmetic failure inside a strategy
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Lift an arithmetic error into a caller's error type.
pub(crate) fn numeric<E: From<ApproximationError>>(error: NumericError) -> E {
    E::from(ApproximationError::Numeric(error))
}
