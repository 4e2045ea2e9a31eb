//! Numeric error types for structured error handling.

use thiserror::Error;

/// Categorised arithmetic and evaluation errors.
///
/// Every fallible operation in the numeric kernel reports one of these
/// variants instead of producing an infinite or undefined value.
///
/// # Variants
/// - `DivisionByZero`: Division or reciprocal of a zero value
/// - `Pole`: Function evaluated at a pole (zero denominator)
/// - `Domain`: Argument outside the domain of a function
/// - `Overflow`: Result magnitude beyond what the kernel represents
/// - `NonConvergence`: Internal series or iteration hit its cap
/// - `InvalidArgument`: Contract violation on construction or call
/// - `Parse`: Malformed numeric literal
/// - `NotImplemented`: Operation deliberately unsupported
///
/// # Examples
/// ```
/// use numeric_core::types::NumericError;
///
/// let err = NumericError::Domain {
///     function: "ln",
///     argument: "-1".to_string(),
/// };
/// assert_eq!(format!("{}", err), "Argument -1 is outside the domain of ln");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    /// Division by a zero-valued operand
    #[error("Division by zero")]
    DivisionByZero,

    /// Evaluation at a pole
    #[error("Pole of {function} at {at}")]
    Pole { function: &'static str, at: String },

    /// Argument outside the function domain
    #[error("Argument {argument} is outside the domain of {function}")]
    Domain {
        function: &'static str,
        argument: String,
    },

    /// Result would overflow the supported exponent range
    #[error("Overflow evaluating {function} at {argument}")]
    Overflow {
        function: &'static str,
        argument: String,
    },

    /// Internal iteration cap reached
    #[error("{function} did not converge within {iterations} iterations")]
    NonConvergence {
        function: &'static str,
        iterations: usize,
    },

    /// Contract violation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed literal
    #[error("Cannot parse '{0}' as a number")]
    Parse(String),

    /// Unsupported operation
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}
