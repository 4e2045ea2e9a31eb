//! Approximation strategies for `f(x) = y` over arbitrary-precision decimals.
//!
//! ## Available Strategies
//!
//! - [`Bisection`]: Robust bracketing method without derivative requirement
//! - [`NewtonRaphson`]: Fast quadratic convergence using derivatives
//! - [`ChainedApproximation`]: A coarse first strategy feeding a precise second one
//!
//! Every strategy evaluates the function with
//! [`GUARD_DIGITS`](numeric_core::math::GUARD_DIGITS) extra digits and
//! reports its result rounded under the caller's context.
//!
//! ## Example
//!
//! ```
//! use numeric_approx::prelude::*;
//! use numeric_core::traits::{Bounded, FnMathFunction, Monotonicity};
//! use numeric_core::types::{Decimal, MathContext};
//!
//! // Solve x² = 2 on [0, 2]
//! let square = Bounded::new(
//!     FnMathFunction::new(
//!         |_: &MathContext, x: &Decimal| Ok::<_, ApproximationError>(x * x),
//!         Monotonicity::Increasing,
//!     ),
//!     Some(Decimal::zero()),
//!     Some(Decimal::from(2)),
//! );
//! let problem = ApproximationProblem::new(&square, Decimal::from(2));
//! let ctx = MathContext::working(20);
//! let result = Bisection::new().approximate(&problem, &ctx).unwrap();
//! assert_eq!(result.value.to_string(), "1.4142135623730950488");
//! ```

mod bisection;
mod bracket;
mod chained;
mod newton_raphson;

pub use bisection::Bisection;
pub use bracket::Bracket;
pub use chained::{ChainedApproximation, ChainedConfig};
pub use newton_raphson::NewtonRaphson;

use std::fmt;

use numeric_core::math::GUARD_DIGITS;
use numeric_core::traits::{BoundedMathFunction, MathFunction};
use numeric_core::types::{Decimal, MathContext};

use crate::error::ApproximationError;

/// Iteration budget used when a problem does not set one.
pub const DEFAULT_MAX_ITERATIONS: usize = 1500;

/// What to solve: `function(x) = target`.
///
/// The function's error type `E` is also the error type of the run; it must
/// absorb [`ApproximationError`] so strategies can report their own failures.
pub struct ApproximationProblem<'a, E> {
    function: &'a dyn BoundedMathFunction<Decimal, Error = E>,
    derivative: Option<&'a dyn MathFunction<Decimal, Error = E>>,
    target: Decimal,
    bracket: Option<Bracket>,
    start: Option<Decimal>,
    max_iterations: usize,
}

impl<'a, E> ApproximationProblem<'a, E> {
    pub fn new(function: &'a dyn BoundedMathFunction<Decimal, Error = E>, target: Decimal) -> Self {
        Self {
            function,
            derivative: None,
            target,
            bracket: None,
            start: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_derivative(mut self, derivative: &'a dyn MathFunction<Decimal, Error = E>) -> Self {
        self.derivative = Some(derivative);
        self
    }

    pub fn with_bracket(mut self, bracket: Bracket) -> Self {
        self.bracket = Some(bracket);
        self
    }

    pub fn with_start(mut self, start: Decimal) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn function(&self) -> &'a dyn BoundedMathFunction<Decimal, Error = E> {
        self.function
    }

    pub fn derivative(&self) -> Option<&'a dyn MathFunction<Decimal, Error = E>> {
        self.derivative
    }

    pub fn target(&self) -> &Decimal {
        &self.target
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn start(&self) -> Option<&Decimal> {
        self.start.as_ref()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// `function(x) - target` under the working context of `ctx`.
    pub fn residual(&self, x: &Decimal, ctx: &MathContext) -> Result<Decimal, E> {
        let value = self.function.calculate_with(&working_context(ctx), x)?;
        Ok(&value - &self.target)
    }

    /// Bracket given explicitly, or spanned by the function's bounds.
    pub(crate) fn bracket_or_bounds(&self) -> Result<Bracket, ApproximationError> {
        match &self.bracket {
            Some(bracket) => Ok(bracket.clone()),
            None => Bracket::from_bounds(self.function),
        }
    }

    /// Residual tolerance `epsilon·max(|target|, 1)` at working precision.
    pub(crate) fn residual_tolerance(&self, ctx: &MathContext) -> Decimal {
        let scale = self.target.abs().max(Decimal::one());
        &working_context(ctx).epsilon() * &scale
    }
}

impl<E> Clone for ApproximationProblem<'_, E> {
    fn clone(&self) -> Self {
        Self {
            function: self.function,
            derivative: self.derivative,
            target: self.target.clone(),
            bracket: self.bracket.clone(),
            start: self.start.clone(),
            max_iterations: self.max_iterations,
        }
    }
}

impl<E> fmt::Debug for ApproximationProblem<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApproximationProblem")
            .field("target", &self.target)
            .field("bracket", &self.bracket)
            .field("start", &self.start)
            .field("has_derivative", &self.derivative.is_some())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Approximation result.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationResult {
    /// Solution estimate rounded under the caller's context
    pub value: Decimal,
    /// Convergence status
    pub converged: bool,
    /// Number of iterations
    pub iterations: usize,
    /// `f(value) - target` at the last evaluated point
    pub residual: Decimal,
}

/// A strategy solving an [`ApproximationProblem`].
pub trait ApproximationStrategy {
    /// Run until convergence or until the budget is spent.
    ///
    /// Exhausting the budget is not an error here: the result carries
    /// `converged == false` and the best estimate.
    fn run<E>(
        &self,
        problem: &ApproximationProblem<'_, E>,
        ctx: &MathContext,
    ) -> Result<ApproximationResult, E>
    where
        E: From<ApproximationError>;

    /// Run and require convergence.
    ///
    /// # Errors
    /// `ApproximationError::NonConvergence` (converted into `E`) carrying the
    /// best estimate when the budget runs out, plus any error of [`run`].
    ///
    /// [`run`]: ApproximationStrategy::run
    fn approximate<E>(
        &self,
        problem: &ApproximationProblem<'_, E>,
        ctx: &MathContext,
    ) -> Result<ApproximationResult, E>
    where
        E: From<ApproximationError>,
    {
        let result = self.run(problem, ctx)?;
        if result.converged {
            Ok(result)
        } else {
            Err(E::from(ApproximationError::NonConvergence {
                best_estimate: result.value,
                iterations: result.iterations,
            }))
        }
    }
}

/// Context every strategy evaluates the function under.
pub(crate) fn working_context(ctx: &MathContext) -> MathContext {
    ctx.widened(GUARD_DIGITS)
}
