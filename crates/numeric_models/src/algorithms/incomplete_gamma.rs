//! Series and continued-fraction expansions of the incomplete gamma function.

use numeric_core::math::{Irrational, GUARD_DIGITS};
use numeric_core::types::{Decimal, MathContext, NumericError};
use tracing::trace;

use crate::algorithms::{
    check_arguments, rounded_difference, AlgorithmStrategy, Regularization,
};

const MAX_SERIES_TERMS: usize = 100_000;
const MAX_FRACTION_TERMS: usize = 100_000;

/// Power series
///
/// ```text
/// γ(α, x) = x^α e^(-x) Σₙ xⁿ / (α (α+1) … (α+n))
/// ```
///
/// All terms are positive, so the sum loses no digits to cancellation. It
/// converges for every `x` but needs about `x` terms before they shrink.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteGammaSeries;

/// Continued fraction for the upper function `Γ(α, x)`, evaluated with the
/// modified Lentz method. Converges quickly for `x ≥ α + 1`.
///
/// The lower function is the complete integral minus the fraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteGammaContinuedFraction;

/// The series for `x < α + 1`, the continued fraction otherwise.
///
/// # Examples
/// ```
/// use numeric_core::types::{Decimal, MathContext};
/// use numeric_models::algorithms::{AlgorithmStrategy, IncompleteGamma, Regularization};
///
/// // P(1, x) = 1 - e^(-x)
/// let p = IncompleteGamma
///     .calculate(
///         &MathContext::working(20),
///         &Regularization::Regularized,
///         &Decimal::from(2),
///         &Decimal::one(),
///     )
///     .unwrap();
/// assert_eq!(p.to_string(), "0.86466471676338730811");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteGamma;

impl IncompleteGamma {
    fn select(x: &Decimal, alpha: &Decimal) -> &'static dyn AlgorithmStrategy {
        if *x < alpha + &Decimal::one() {
            &IncompleteGammaSeries
        } else {
            &IncompleteGammaContinuedFraction
        }
    }
}

/// `x^α e^(-x)`, divided by `Γ(α)` when regularised.
fn prefactor(
    x: &Decimal,
    alpha: &Decimal,
    regularization: &Regularization,
    ctx: &MathContext,
) -> Result<Decimal, NumericError> {
    let mut exponent = Irrational::value(alpha.clone()) * Irrational::value(x.clone()).ln()
        - Irrational::value(x.clone());
    if let Some(ln_gamma) = regularization.ln_gamma(alpha) {
        exponent = exponent - ln_gamma;
    }
    exponent.exp().value_to_precision(ctx)
}

/// `Σₙ xⁿ / (α (α+1) … (α+n))` to the precision of `ctx`.
fn series_sum(x: &Decimal, alpha: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    let epsilon = ctx.epsilon();
    let mut denominator = alpha.clone();
    let mut term = Decimal::one().div(alpha, ctx)?;
    let mut sum = term.clone();
    for n in 1..=MAX_SERIES_TERMS {
        denominator = &denominator + &Decimal::one();
        term = (&term * x).div(&denominator, ctx)?;
        sum = (&sum + &term).round(ctx);
        if term <= &sum * &epsilon {
            trace!(terms = n, "incomplete gamma series converged");
            return Ok(sum);
        }
    }
    Err(NumericError::NonConvergence {
        function: "incomplete gamma series",
        iterations: MAX_SERIES_TERMS,
    })
}

/// Continued fraction `1/(x+1-α- 1·(1-α)/(x+3-α- 2·(2-α)/(x+5-α- …)))`.
fn continued_fraction(
    x: &Decimal,
    alpha: &Decimal,
    ctx: &MathContext,
) -> Result<Decimal, NumericError> {
    let tiny = Decimal::new(1, -3 * ctx.precision() as i64);
    let epsilon = ctx.epsilon();
    let one = Decimal::one();
    let two = Decimal::from(2);

    let mut b = &(x + &one) - alpha;
    let mut c = one.div(&tiny, ctx)?;
    let mut d = if b.abs() < tiny {
        c.clone()
    } else {
        b.recip(ctx)?
    };
    let mut h = d.clone();
    for i in 1..=MAX_FRACTION_TERMS {
        let index = Decimal::from(i);
        let a = -(&index * &(&index - alpha));
        b = &b + &two;
        d = (&(&a * &d) + &b).round(ctx);
        if d.abs() < tiny {
            d = tiny.clone();
        }
        c = (&b + &a.div(&c, ctx)?).round(ctx);
        if c.abs() < tiny {
            c = tiny.clone();
        }
        d = d.recip(ctx)?;
        let delta = (&d * &c).round(ctx);
        h = (&h * &delta).round(ctx);
        if (&delta - &one).abs() <= epsilon {
            trace!(terms = i, "incomplete gamma continued fraction converged");
            return Ok(h);
        }
    }
    Err(NumericError::NonConvergence {
        function: "incomplete gamma continued fraction",
        iterations: MAX_FRACTION_TERMS,
    })
}

impl IncompleteGammaContinuedFraction {
    /// `Γ(α, x)` or `Q(α, x)` at the precision of `ctx`, for `x > 0`.
    fn upper(
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        let fraction = continued_fraction(x, alpha, ctx)?;
        let prefactor = prefactor(x, alpha, regularization, ctx)?;
        Ok((&prefactor * &fraction).round(ctx))
    }
}

impl AlgorithmStrategy for IncompleteGammaSeries {
    fn name(&self) -> &'static str {
        "series"
    }

    fn calculate(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        check_arguments(x, alpha)?;
        if x.is_zero() {
            return Ok(Decimal::zero());
        }
        let wctx = ctx.widened(GUARD_DIGITS);
        let sum = series_sum(x, alpha, &wctx)?;
        let prefactor = prefactor(x, alpha, regularization, &wctx)?;
        Ok((&prefactor * &sum).round(ctx))
    }
}

impl AlgorithmStrategy for IncompleteGammaContinuedFraction {
    fn name(&self) -> &'static str {
        "continued fraction"
    }

    fn calculate(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        check_arguments(x, alpha)?;
        if x.is_zero() {
            return Ok(Decimal::zero());
        }
        let wctx = ctx.widened(GUARD_DIGITS);
        let upper = Self::upper(&wctx, regularization, x, alpha)?;
        let total = regularization.total(alpha, &wctx)?;
        Ok(rounded_difference(&total, &upper, ctx))
    }

    fn calculate_complement(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        check_arguments(x, alpha)?;
        if x.is_zero() {
            return regularization.total(alpha, ctx);
        }
        let wctx = ctx.widened(GUARD_DIGITS);
        Ok(Self::upper(&wctx, regularization, x, alpha)?.round(ctx))
    }
}

impl AlgorithmStrategy for IncompleteGamma {
    fn name(&self) -> &'static str {
        "incomplete gamma"
    }

    fn calculate(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        check_arguments(x, alpha)?;
        let strategy = Self::select(x, alpha);
        trace!(strategy = strategy.name(), %x, %alpha, "lower incomplete gamma");
        strategy.calculate(ctx, regularization, x, alpha)
    }

    fn calculate_complement(
        &self,
        ctx: &MathContext,
        regularization: &Regularization,
        x: &Decimal,
        alpha: &Decimal,
    ) -> Result<Decimal, NumericError> {
        check_arguments(x, alpha)?;
        let strategy = Self::select(x, alpha);
        trace!(strategy = strategy.name(), %x, %alpha, "upper incomplete gamma");
        strategy.calculate_complement(ctx, regularization, x, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numeric_core::math::gamma::ln_gamma;
    use numeric_core::types::RoundingMode;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ctx30() -> MathContext {
        MathContext::new(30, RoundingMode::HalfEven).unwrap()
    }

    /// `actual` agrees with `expected` to about `digits` significant digits.
    fn assert_close(actual: &Decimal, expected: &str, digits: i64) {
        let expected = dec(expected);
        let tolerance = Decimal::new(1, expected.adjusted_exponent() - digits + 1);
        assert!(
            (actual - &expected).abs() <= tolerance,
            "{} differs from {} beyond {} digits",
            actual,
            expected,
            digits
        );
    }

    fn regularized(strategy: &dyn AlgorithmStrategy, x: &str, alpha: &str) -> Decimal {
        strategy
            .calculate(&ctx30(), &Regularization::Regularized, &dec(x), &dec(alpha))
            .unwrap()
    }

    #[test]
    fn test_series_reference_values() {
        let series = IncompleteGammaSeries;
        assert_close(&regularized(&series, "1", "2"), "0.264241117657115356808952459677", 29);
        // erf(1) = P(1/2, 1)
        assert_close(&regularized(&series, "1", "0.5"), "0.842700792949714869341220635083", 29);
        assert_close(&regularized(&series, "3", "10"), "0.00110248813011547974213980172095", 29);
    }

    #[test]
    fn test_continued_fraction_reference_values() {
        let fraction = IncompleteGammaContinuedFraction;
        assert_close(&regularized(&fraction, "10", "3"), "0.997230604284488424056328917551", 29);
        assert_close(&regularized(&fraction, "2", "0.5"), "0.954499736103641585599434725667", 29);
        let q = fraction
            .calculate_complement(&ctx30(), &Regularization::Regularized, &dec("10"), &dec("3"))
            .unwrap();
        assert_close(&q, "0.00276939571551157594367108244919", 29);
    }

    #[test]
    fn test_strategies_agree() {
        for (x, alpha) in [("2.5", "2"), ("4", "3.5"), ("0.75", "0.25")] {
            let series = regularized(&IncompleteGammaSeries, x, alpha);
            let fraction = regularized(&IncompleteGammaContinuedFraction, x, alpha);
            assert_close(&series, &fraction.to_string(), 27);
        }
    }

    #[test]
    fn test_automatic_selection() {
        let ctx = ctx30();
        let reg = Regularization::Regularized;
        let small = IncompleteGamma.calculate(&ctx, &reg, &dec("3"), &dec("10")).unwrap();
        let large = IncompleteGamma.calculate(&ctx, &reg, &dec("10"), &dec("3")).unwrap();
        assert_close(&small, "0.00110248813011547974213980172095", 29);
        assert_close(&large, "0.997230604284488424056328917551", 29);
    }

    #[test]
    fn test_unregularized_lower_and_upper() {
        let ctx = ctx30();
        let lower = IncompleteGamma
            .calculate(&ctx, &Regularization::None, &dec("1.5"), &dec("2.5"))
            .unwrap();
        assert_close(&lower, "0.398820945392344629606384253213", 29);
        let upper = IncompleteGamma
            .calculate_complement(&ctx, &Regularization::None, &dec("1.5"), &dec("2.5"))
            .unwrap();
        assert_close(&upper, "0.930519442786792390867241359293", 29);
        let lower = IncompleteGamma
            .calculate(&ctx, &Regularization::None, &dec("10"), &dec("3"))
            .unwrap();
        assert_close(&lower, "1.99446120856897684811265783510", 29);
    }

    #[test]
    fn test_precomputed_matches_regularized() {
        let ctx = ctx30();
        let alpha = dec("0.000841625");
        let x = dec("0.2086");
        let ln_gamma_alpha = ln_gamma(&alpha, &ctx.widened(GUARD_DIGITS)).unwrap();
        let precomputed = IncompleteGamma
            .calculate(&ctx, &Regularization::Precomputed(ln_gamma_alpha), &x, &alpha)
            .unwrap();
        let regularized = IncompleteGamma
            .calculate(&ctx, &Regularization::Regularized, &x, &alpha)
            .unwrap();
        assert_close(&precomputed, &regularized.to_string(), 29);
        assert_close(&precomputed, "0.998999921713007627470680588410", 29);
    }

    #[test]
    fn test_complement_sums_to_one() {
        let ctx = ctx30();
        let reg = Regularization::Regularized;
        for (x, alpha) in [("0.3", "2"), ("7", "2"), ("1", "0.5")] {
            let p = IncompleteGamma.calculate(&ctx, &reg, &dec(x), &dec(alpha)).unwrap();
            let q = IncompleteGamma
                .calculate_complement(&ctx, &reg, &dec(x), &dec(alpha))
                .unwrap();
            assert_close(&(&p + &q), "1", 28);
        }
    }

    #[test]
    fn test_zero_argument() {
        let ctx = ctx30();
        let reg = Regularization::Regularized;
        let zero = Decimal::zero();
        assert_eq!(IncompleteGamma.calculate(&ctx, &reg, &zero, &dec("2")).unwrap(), zero);
        assert_eq!(
            IncompleteGammaContinuedFraction
                .calculate_complement(&ctx, &reg, &zero, &dec("2"))
                .unwrap(),
            Decimal::one()
        );
    }

    #[test]
    fn test_domain_errors() {
        let ctx = ctx30();
        let reg = Regularization::Regularized;
        assert!(matches!(
            IncompleteGamma.calculate(&ctx, &reg, &dec("1"), &Decimal::zero()),
            Err(NumericError::Domain { function: "incomplete gamma", .. })
        ));
        assert!(matches!(
            IncompleteGammaSeries.calculate(&ctx, &reg, &dec("-1"), &dec("2")),
            Err(NumericError::Domain { .. })
        ));
        assert!(matches!(
            IncompleteGammaContinuedFraction.calculate_complement(&ctx, &reg, &dec("1"), &dec("-2")),
            Err(NumericError::Domain { .. })
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn test_regularized_lies_in_unit_interval(x in 1u32..4000, alpha in 1u32..400) {
                let x = Decimal::new(x, -2);
                let alpha = Decimal::new(alpha, -2);
                let p = IncompleteGamma
                    .calculate(&MathContext::DECIMAL64, &Regularization::Regularized, &x, &alpha)
                    .unwrap();
                prop_assert!(!p.is_negative());
                prop_assert!(p <= Decimal::one());
            }

            #[test]
            fn test_monotone_in_x(x in 1u32..2000, step in 1u32..500, alpha in 1u32..400) {
                let alpha = Decimal::new(alpha, -2);
                let reg = Regularization::Regularized;
                let ctx = MathContext::DECIMAL64;
                let a = IncompleteGamma.calculate(&ctx, &reg, &Decimal::new(x, -2), &alpha).unwrap();
                let b = IncompleteGamma
                    .calculate(&ctx, &reg, &Decimal::new(x + step, -2), &alpha)
                    .unwrap();
                prop_assert!(a <= b);
            }
        }
    }
}
