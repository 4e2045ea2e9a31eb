//! Probability distributions over arbitrary-precision decimals.
//!
//! A [`Distribution`] exposes four derived functions: density, inverse
//! density, cumulative distribution and its inverse (the quantile). Each is
//! built on first access and cached for the lifetime of the distribution, so
//! a distribution can be shared between threads and queried concurrently.
//!
//! Inverse functions are approximated with [`ChainedApproximation`]
//! (bisection warm-up, Newton-Raphson finish) inside a bracket grown from a
//! moment-based initial guess.

mod gamma;
mod normal;

pub use gamma::GammaDistribution;
pub use normal::NormalDistribution;

use numeric_approx::{
    ApproximationProblem, ApproximationStrategy, Bracket, ChainedApproximation, ChainedConfig,
    DEFAULT_MAX_ITERATIONS,
};
use numeric_core::traits::{BoundedMathFunction, MathFunction};
use numeric_core::types::{Decimal, MathContext};
use tracing::debug;

use crate::error::DistributionError;

/// A derived function of a distribution.
pub type DistributionFunction =
    dyn BoundedMathFunction<Decimal, Error = DistributionError> + Send + Sync;

/// Budgets for approximating inverse functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantileConfig {
    /// Total iteration budget
    pub max_iterations: usize,
    /// Iterations of the bisection warm-up
    pub warmup_iterations: usize,
    /// Precision of the warm-up; `None` keeps the query precision
    pub warmup_digits: Option<u64>,
    /// Maximum bracket expansions before giving up
    pub max_expansions: usize,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            warmup_iterations: 300,
            warmup_digits: Some(16),
            max_expansions: 64,
        }
    }
}

impl QuantileConfig {
    fn strategy(&self) -> ChainedApproximation {
        ChainedApproximation::new().with_config(ChainedConfig {
            warmup_iterations: self.warmup_iterations,
            warmup_digits: self.warmup_digits,
        })
    }
}

/// A univariate probability distribution.
///
/// # Example
///
/// ```
/// use numeric_core::types::{Decimal, MathContext};
/// use numeric_models::distributions::{Distribution, GammaDistribution};
///
/// let dist = GammaDistribution::new(Decimal::from(2), Decimal::from(3)).unwrap();
/// let ctx = MathContext::working(20);
/// let median = dist.quantile(&ctx, &"0.5".parse().unwrap()).unwrap();
/// assert_eq!(median.to_string(), "5.0350409700499819602");
/// ```
pub trait Distribution: Send + Sync {
    fn probability_density_function(&self) -> &DistributionFunction;

    /// Density to argument; for unimodal densities the solution right of the mode.
    fn inverse_probability_density_function(&self) -> &DistributionFunction;

    fn cumulative_density_function(&self) -> &DistributionFunction;

    /// Confidence level to quantile.
    fn inverse_cumulative_density_function(&self) -> &DistributionFunction;

    fn mean(&self, ctx: &MathContext) -> Result<Decimal, DistributionError>;

    fn variance(&self, ctx: &MathContext) -> Result<Decimal, DistributionError>;

    fn pdf(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        self.probability_density_function().calculate_with(ctx, x)
    }

    fn cdf(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        self.cumulative_density_function().calculate_with(ctx, x)
    }

    fn quantile(
        &self,
        ctx: &MathContext,
        confidence: &Decimal,
    ) -> Result<Decimal, DistributionError> {
        self.inverse_cumulative_density_function()
            .calculate_with(ctx, confidence)
    }

    fn inverse_pdf(&self, ctx: &MathContext, density: &Decimal) -> Result<Decimal, DistributionError> {
        self.inverse_probability_density_function()
            .calculate_with(ctx, density)
    }
}

/// Solve `function(x) = target` starting from `initial`, grown as needed.
pub(crate) fn invert(
    function: &dyn BoundedMathFunction<Decimal, Error = DistributionError>,
    derivative: &dyn MathFunction<Decimal, Error = DistributionError>,
    target: &Decimal,
    initial: Bracket,
    config: &QuantileConfig,
    ctx: &MathContext,
) -> Result<Decimal, DistributionError> {
    let bracket = initial.expand(function, target, ctx, config.max_expansions)?;
    let problem = ApproximationProblem::new(function, target.clone())
        .with_derivative(derivative)
        .with_bracket(bracket)
        .with_max_iterations(config.max_iterations);
    let result = config.strategy().approximate(&problem, ctx)?;
    debug!(
        %target,
        value = %result.value,
        iterations = result.iterations,
        "inverse approximated"
    );
    Ok(result.value)
}

/// Reject confidence levels outside `[lower, 1)`.
pub(crate) fn check_confidence(
    confidence: &Decimal,
    allow_zero: bool,
) -> Result<(), DistributionError> {
    let below = if allow_zero {
        confidence.is_negative()
    } else {
        !confidence.is_positive()
    };
    if below || *confidence >= Decimal::one() {
        let interval = if allow_zero { "[0, 1)" } else { "(0, 1)" };
        return Err(DistributionError::InvalidArgument(format!(
            "confidence level {} outside {}",
            confidence, interval
        )));
    }
    Ok(())
}
