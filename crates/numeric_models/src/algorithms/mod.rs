//! Incomplete gamma function algorithms.
//!
//! Every strategy computes the lower incomplete gamma function
//!
//! ```text
//! γ(α, x) = ∫₀ˣ t^(α-1) e^(-t) dt
//! ```
//!
//! or its regularised form `P(α, x) = γ(α, x) / Γ(α)`, selected by
//! [`Regularization`].
//!
//! ## Available Strategies
//!
//! - [`IncompleteGammaSeries`]: Power series, fast for `x < α + 1`
//! - [`IncompleteGammaContinuedFraction`]: Continued fraction (modified Lentz) for the complement
//! - [`IncompleteGamma`]: Picks the series or the continued fraction by argument

mod incomplete_gamma;

pub use incomplete_gamma::{
    IncompleteGamma, IncompleteGammaContinuedFraction, IncompleteGammaSeries,
};

use numeric_core::math::{Irrational, GUARD_DIGITS};
use numeric_core::types::{Decimal, MathContext, NumericError};

/// Normalisation of the incomplete gamma function.
#[derive(Debug, Clone, PartialEq)]
pub enum Regularization {
    /// `P(α, x)`, computing `ln Γ(α)` on demand
    Regularized,
    /// `P(α, x)` with a caller-supplied `ln Γ(α)`
    Precomputed(Decimal),
    /// The lower incomplete gamma function `γ(α, x)` itself
    None,
}

impl Regularization {
    /// `ln Γ(α)` as an expression, if the result is normalised.
    pub(crate) fn ln_gamma(&self, alpha: &Decimal) -> Option<Irrational> {
        match self {
            Regularization::Regularized => Some(Irrational::value(alpha.clone()).ln_gamma()),
            Regularization::Precomputed(ln_gamma) => Some(Irrational::value(ln_gamma.clone())),
            Regularization::None => None,
        }
    }

    /// Value of the complete integral: 1 when normalised, `Γ(α)` otherwise.
    pub(crate) fn total(&self, alpha: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
        match self {
            Regularization::None => Irrational::value(alpha.clone()).gamma().value_to_precision(ctx),
            _ => Ok(Decimal::one()),
        }
    }
}

/// A method of evaluating the incomplete gamma function.
pub trait AlgorithmStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Lower incomplete gamma `γ(α, x)`, or `P(α, x)` when regularised.
    ///
    /// # Errors
    /// - `NumericError::Domain` for `α ≤ 0` or `x < 0`
    /// - `NumericError::NonConvergence` if the expansion hits its term cap
    fn calculate(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError>;

    /// Upper incomplete gamma `Γ(α, x)`, or `Q(α, x) = 1 - P(α, x)` when
    /// regularised.
    ///
    /// The default subtracts [`calculate`](AlgorithmStrategy::calculate) from
    /// the complete integral at working precision.
    fn calculate_complement(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        check_arguments(x, alpha)?;
        let wctx = ctx.widened(GUARD_DIGITS);
        let lower = self.calculate(&wctx, regularization, x, alpha)?;
        let total = regularization.total(alpha, &wctx)?;
        Ok(rounded_difference(&total, &lower, ctx))
    }
}

/// `minuend - subtrahend` rounded under `ctx`.
///
/// A subtrahend below the last digit of `minuend` only decides the rounding
/// direction, so it is replaced by a unit two places past that digit. This
/// keeps `1 - Q` cheap when `Q` is something like `10^-(10^12)`.
pub(crate) fn rounded_difference(
    minuend: &Decimal,
    subtrahend: &Decimal,
    ctx: &MathContext,
) -> Decimal {
    if subtrahend.is_zero() {
        return minuend.round(ctx);
    }
    let sticky = minuend.adjusted_exponent() - ctx.precision() as i64 - 2;
    if !minuend.is_zero() && subtrahend.adjusted_exponent() < sticky {
        let unit = Decimal::new(subtrahend.signum(), sticky);
        return (minuend - &unit).round(ctx);
    }
    (minuend - subtrahend).round(ctx)
}

pub(crate) fn check_arguments(x: &Decimal, alpha: &Decimal) -> Result<(), NumericError> {
    if !alpha.is_positive() {
        return Err(NumericError::Domain {
            function: "incomplete gamma",
            argument: format!("alpha = {}", alpha),
        });
    }
    if x.is_negative() {
        return Err(NumericError::Domain {
            function: "incomplete gamma",
            argument: format!("x = {}", x),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use numeric_core::types::RoundingMode;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_rounded_difference_of_comparable_values() {
        let ctx = MathContext::DECIMAL32;
        assert_eq!(
            rounded_difference(&Decimal::one(), &dec("0.25"), &ctx),
            dec("0.75")
        );
        assert_eq!(rounded_difference(&Decimal::one(), &Decimal::zero(), &ctx), Decimal::one());
    }

    #[test]
    fn test_rounded_difference_with_negligible_subtrahend() {
        let negligible = Decimal::new(1, -1_000_000_000_000);
        let half_even = MathContext::DECIMAL64;
        assert_eq!(
            rounded_difference(&Decimal::one(), &negligible, &half_even),
            Decimal::one()
        );
        // directed rounding still sees which side of one the result lies on
        let down = MathContext::new(5, RoundingMode::Down).unwrap();
        assert_eq!(
            rounded_difference(&Decimal::one(), &negligible, &down),
            dec("0.99999")
        );
        let up = MathContext::new(5, RoundingMode::Up).unwrap();
        assert_eq!(
            rounded_difference(&Decimal::one(), &-negligible, &up),
            dec("1.0001")
        );
    }
}
