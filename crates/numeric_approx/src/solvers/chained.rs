//! Two-stage approximation: a robust warm-up feeding a fast finisher.

use numeric_core::types::MathContext;
use tracing::debug;

use crate::error::ApproximationError;
use crate::solvers::{
    ApproximationProblem, ApproximationResult, ApproximationStrategy, Bisection, NewtonRaphson,
};

/// Budget split of a [`ChainedApproximation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedConfig {
    /// Iterations granted to the first strategy
    pub warmup_iterations: usize,
    /// Precision of the first strategy; `None` keeps the caller's precision
    pub warmup_digits: Option<u64>,
}

impl Default for ChainedConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: 300,
            warmup_digits: Some(16),
        }
    }
}

/// Runs `first` on a reduced budget and precision, then hands its estimate
/// to `second` as the start value.
///
/// The first stage need not converge; whatever it reaches is the second
/// stage's starting point. Iteration counts add up, and the second stage
/// gets what remains of the problem's budget.
#[derive(Debug, Clone, Default)]
pub struct ChainedApproximation<A = Bisection, B = NewtonRaphson> {
    first: A,
    second: B,
    config: ChainedConfig,
}

impl ChainedApproximation {
    /// Bisection followed by Newton-Raphson with the default budget split.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A, B> ChainedApproximation<A, B> {
    pub fn with_strategies(first: A, second: B) -> Self {
        Self {
            first,
            second,
            config: ChainedConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ChainedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ChainedConfig {
        &self.config
    }
}

impl<A, B> ApproximationStrategy for ChainedApproximation<A, B>
where
    A: ApproximationStrategy,
    B: ApproximationStrategy,
{
    fn run<E>(
        &self,
        problem: &ApproximationProblem<'_, E>,
        ctx: &MathContext,
    ) -> Result<ApproximationResult, E>
    where
        E: From<ApproximationError>,
    {
        let budget = problem.max_iterations();
        let warmup = self.config.warmup_iterations.min(budget);
        let coarse_ctx = match self.config.warmup_digits {
            Some(digits) => ctx.with_precision(digits.min(ctx.precision())),
            None => *ctx,
        };

        let warmup_problem = problem.clone().with_max_iterations(warmup);
        let first = self.first.run(&warmup_problem, &coarse_ctx)?;
        debug!(
            iterations = first.iterations,
            converged = first.converged,
            estimate = %first.value,
            "warm-up stage finished"
        );

        let remaining = budget - first.iterations.min(budget);
        let final_problem = problem
            .clone()
            .with_start(first.value)
            .with_max_iterations(remaining);
        let second = self.second.run(&final_problem, ctx)?;

        Ok(ApproximationResult {
            iterations: first.iterations + second.iterations,
            ..second
        })
    }
}
