//! Distribution errors.

use numeric_approx::ApproximationError;
use numeric_core::types::{Decimal, NumericError};
use thiserror::Error;

/// Errors that can occur while constructing or querying a distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// Distribution parameter violates its contract
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: Decimal,
        reason: &'static str,
    },

    /// Query argument outside the function's domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Arithmetic failure
    #[error(transparent)]
    Numeric(#[from] NumericError),

    /// Inverse function could not be approximated
    #[error(transparent)]
    Approximation(#[from] ApproximationError),
}
