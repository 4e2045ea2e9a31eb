//! Newton-Raphson iteration.

use numeric_core::types::{Decimal, MathContext};
use tracing::{debug, trace, warn};

use crate::error::{numeric, ApproximationError};
use crate::solvers::{working_context, ApproximationProblem, ApproximationResult, ApproximationStrategy};

/// Newton-Raphson: `x ← x - (f(x) - y) / f'(x)`.
///
/// Starts from the problem's start value, else from the middle of its bracket
/// or bounded domain. A step leaving the function's domain is replaced by
/// the halfway point between the current iterate and the bound it crossed.
///
/// Converges when two successive iterates round to the same value under the
/// caller's context, when the step falls below one working ulp, or when the
/// residual is below `epsilon·max(|target|, 1)` at working precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonRaphson;

impl NewtonRaphson {
    pub fn new() -> Self {
        Self
    }

    fn start<E>(problem: &ApproximationProblem<'_, E>) -> Result<Decimal, ApproximationError> {
        if let Some(start) = problem.start() {
            return Ok(start.clone());
        }
        problem
            .bracket_or_bounds()
            .map(|bracket| bracket.midpoint())
            .map_err(|_| ApproximationError::MissingStart)
    }
}

impl ApproximationStrategy for NewtonRaphson {
    fn run<E>(
        &self,
        problem: &ApproximationProblem<'_, E>,
        ctx: &MathContext,
    ) -> Result<ApproximationResult, E>
    where
        E: From<ApproximationError>,
    {
        let derivative = problem
            .derivative()
            .ok_or(ApproximationError::MissingDerivative)?;
        let mut x = Self::start(problem)?;
        let wctx = working_context(ctx);
        let tolerance = problem.residual_tolerance(ctx);
        let lower_bound = problem.function().lower_bound();
        let upper_bound = problem.function().upper_bound();
        let half = Decimal::half();

        let mut residual = problem.residual(&x, ctx)?;
        for iteration in 1..=problem.max_iterations() {
            if residual.abs() <= tolerance {
                debug!(iteration, value = %x, "newton-raphson converged on residual");
                return Ok(converged(x, iteration - 1, residual, ctx));
            }
            let slope = derivative.calculate_with(&wctx, &x)?;
            if slope.is_zero() {
                return Err(E::from(ApproximationError::VanishingDerivative {
                    at: x.round(ctx),
                    iterations: iteration - 1,
                }));
            }
            let step = residual.div(&slope, &wctx).map_err(numeric::<E>)?;
            let mut next = (&x - &step).round(&wctx);
            match (&lower_bound, &upper_bound) {
                (Some(bound), _) if next < *bound => {
                    next = (&(&x + bound) * &half).round(&wctx);
                }
                (_, Some(bound)) if next > *bound => {
                    next = (&(&x + bound) * &half).round(&wctx);
                }
                _ => {}
            }
            trace!(iteration, %next, %residual, "newton-raphson step");

            let settled = next.round(ctx) == x.round(ctx) || step.abs() <= wctx.ulp(&next);
            residual = problem.residual(&next, ctx)?;
            x = next;
            if settled {
                debug!(iteration, value = %x, "newton-raphson converged");
                return Ok(converged(x, iteration, residual, ctx));
            }
        }
        if residual.abs() <= tolerance {
            return Ok(converged(x, problem.max_iterations(), residual, ctx));
        }

        warn!(
            iterations = problem.max_iterations(),
            best_estimate = %x,
            "newton-raphson did not converge"
        );
        Ok(ApproximationResult {
            value: x.round(ctx),
            converged: false,
            iterations: problem.max_iterations(),
            residual,
        })
    }
}

fn converged(
    value: Decimal,
    iterations: usize,
    residual: Decimal,
    ctx: &MathContext,
) -> ApproximationResult {
    ApproximationResult {
        value: value.round(ctx),
        converged: true,
        iterations,
        residual,
    }
}
