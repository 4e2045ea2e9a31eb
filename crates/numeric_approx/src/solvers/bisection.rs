//! Bisection on a sign-changing bracket.

use numeric_core::types::{Decimal, MathContext};
use tracing::{debug, trace, warn};

use crate::error::ApproximationError;
use crate::solvers::{working_context, ApproximationProblem, ApproximationResult, ApproximationStrategy};

/// Interval halving.
///
/// Needs a bracket, either from the problem or from a bounded domain, whose
/// end residuals differ in sign. Each iteration halves the bracket, so the
/// method always converges, linearly.
///
/// Converges when
/// - both ends round to the same value under the caller's context, or
/// - the bracket is narrower than one unit in the last place at working
///   precision, or
/// - the residual is below `epsilon·max(|target|, 1)` at working precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bisection;

impl Bisection {
    pub fn new() -> Self {
        Self
    }
}

impl ApproximationStrategy for Bisection {
    fn run<E>(
        &self,
        problem: &ApproximationProblem<'_, E>,
        ctx: &MathContext,
    ) -> Result<ApproximationResult, E>
    where
        E: From<ApproximationError>,
    {
        let bracket = problem.bracket_or_bounds().map_err(E::from)?;
        let wctx = working_context(ctx);
        let tolerance = problem.residual_tolerance(ctx);
        let half = Decimal::half();

        let mut lower = bracket.lower().clone();
        let mut upper = bracket.upper().clone();
        let mut lower_residual = problem.residual(&lower, ctx)?;
        if lower_residual.is_zero() {
            return Ok(converged(lower, 0, lower_residual, ctx));
        }
        let upper_residual = problem.residual(&upper, ctx)?;
        if upper_residual.is_zero() {
            return Ok(converged(upper, 0, upper_residual, ctx));
        }
        if lower_residual.signum() == upper_residual.signum() {
            return Err(E::from(ApproximationError::InvalidBracket { lower, upper }));
        }

        // best estimate so far, for a run that exhausts its budget
        let (mut best, mut best_residual) = if lower_residual.abs() <= upper_residual.abs() {
            (lower.clone(), lower_residual.clone())
        } else {
            (upper.clone(), upper_residual)
        };

        for iteration in 1..=problem.max_iterations() {
            let midpoint = (&(&lower + &upper) * &half).round(&wctx);
            if midpoint == lower || midpoint == upper {
                debug!(iteration, value = %midpoint, "bisection reached working precision");
                let residual = problem.residual(&midpoint, ctx)?;
                return Ok(converged(midpoint, iteration, residual, ctx));
            }
            let residual = problem.residual(&midpoint, ctx)?;
            trace!(iteration, %midpoint, %residual, "bisection step");

            if residual.is_zero() || residual.abs() <= tolerance {
                debug!(iteration, value = %midpoint, "bisection converged on residual");
                return Ok(converged(midpoint, iteration, residual, ctx));
            }
            if residual.signum() == lower_residual.signum() {
                lower = midpoint.clone();
                lower_residual = residual.clone();
            } else {
                upper = midpoint.clone();
            }
            if residual.abs() < best_residual.abs() {
                best = midpoint.clone();
                best_residual = residual.clone();
            }

            if lower.round(ctx) == upper.round(ctx) || &upper - &lower <= wctx.ulp(&midpoint) {
                debug!(iteration, value = %midpoint, "bisection converged on bracket width");
                return Ok(converged(midpoint, iteration, residual, ctx));
            }
        }

        warn!(
            iterations = problem.max_iterations(),
            best_estimate = %best,
            "bisection did not converge"
        );
        Ok(ApproximationResult {
            value: best.round(ctx),
            converged: false,
            iterations: problem.max_iterations(),
            residual: best_residual,
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
