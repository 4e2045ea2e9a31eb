//! Gamma distribution with shape `α` and scale `β`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use numeric_approx::Bracket;
use numeric_core::math::{elementary, gamma, Irrational, GUARD_DIGITS};
use numeric_core::traits::{BoundedMathFunction, MathFunction, Monotonicity};
use numeric_core::types::{Decimal, MathContext};
use tracing::{debug, instrument};

use crate::algorithms::{AlgorithmStrategy, IncompleteGamma, Regularization};
use crate::distributions::{
    check_confidence, invert, Distribution, DistributionFunction, QuantileConfig,
};
use crate::error::DistributionError;

/// Digits of `ln Γ(α)` kept beyond the construction precision; covers the
/// guard digits of the solver, the incomplete gamma and the expression
/// evaluator stacked on top of each other.
const LN_GAMMA_HEADROOM: u64 = 3 * GUARD_DIGITS;

/// Gamma distribution
///
/// ```text
/// f(x) = x^(α-1) e^(-x/β) / (β^α Γ(α)),  x > 0
/// ```
///
/// `ln Γ(α)` is computed once, at construction, to the construction
/// precision plus headroom. Queries at a higher precision recompute it.
///
/// # Examples
/// ```
/// use numeric_core::types::{Decimal, MathContext};
/// use numeric_models::distributions::{Distribution, GammaDistribution};
///
/// let dist = GammaDistribution::new(Decimal::from(2), Decimal::from(3)).unwrap();
/// let ctx = MathContext::working(20);
/// assert_eq!(dist.mean(&ctx).unwrap(), Decimal::from(6));
/// assert_eq!(dist.cdf(&ctx, &Decimal::from(4)).unwrap().to_string(), "0.38494001106330420315");
/// assert!(GammaDistribution::new(Decimal::zero(), Decimal::one()).is_err());
/// ```
pub struct GammaDistribution {
    parameters: Arc<GammaParameters>,
    config: QuantileConfig,
    pdf: OnceLock<Box<DistributionFunction>>,
    inverse_pdf: OnceLock<Box<DistributionFunction>>,
    cdf: OnceLock<Box<DistributionFunction>>,
    inverse_cdf: OnceLock<Box<DistributionFunction>>,
}

impl GammaDistribution {
    /// Gamma distribution with `ln Γ(α)` precomputed under
    /// [`MathContext::DEFAULT`].
    ///
    /// # Errors
    /// `DistributionError::InvalidParameter` unless `alpha > 0` and `beta > 0`.
    pub fn new(alpha: Decimal, beta: Decimal) -> Result<Self, DistributionError> {
        Self::with_context(alpha, beta, &MathContext::DEFAULT)
    }

    /// Gamma distribution with `ln Γ(α)` precomputed for queries up to the
    /// precision of `ctx`.
    pub fn with_context(
        alpha: Decimal,
        beta: Decimal,
        ctx: &MathContext,
    ) -> Result<Self, DistributionError> {
        if !alpha.is_positive() {
            return Err(DistributionError::InvalidParameter {
                name: "alpha",
                value: alpha,
                reason: "shape must be positive",
            });
        }
        if !beta.is_positive() {
            return Err(DistributionError::InvalidParameter {
                name: "beta",
                value: beta,
                reason: "scale must be positive",
            });
        }
        let ln_gamma_digits = ctx.precision() + LN_GAMMA_HEADROOM;
        let ln_gamma_alpha = gamma::ln_gamma(&alpha, &MathContext::working(ln_gamma_digits))?;
        debug!(%alpha, %beta, digits = ln_gamma_digits, "gamma distribution created");

        Ok(Self {
            parameters: Arc::new(GammaParameters {
                alpha,
                beta,
                ln_gamma_alpha,
                ln_gamma_digits,
            }),
            config: QuantileConfig::default(),
            pdf: OnceLock::new(),
            inverse_pdf: OnceLock::new(),
            cdf: OnceLock::new(),
            inverse_cdf: OnceLock::new(),
        })
    }

    /// Replace the budgets used by the inverse functions.
    pub fn with_config(mut self, config: QuantileConfig) -> Self {
        self.config = config;
        self.inverse_pdf = OnceLock::new();
        self.inverse_cdf = OnceLock::new();
        self
    }

    /// Shape `α`.
    pub fn alpha(&self) -> &Decimal {
        &self.parameters.alpha
    }

    /// Scale `β`.
    pub fn beta(&self) -> &Decimal {
        &self.parameters.beta
    }

    /// `ln Γ(α)` as computed at construction.
    pub fn ln_gamma_alpha(&self) -> &Decimal {
        &self.parameters.ln_gamma_alpha
    }

    pub fn config(&self) -> &QuantileConfig {
        &self.config
    }

    /// Location of the density maximum: `(α - 1)β` for `α > 1`, else 0.
    pub fn mode(&self) -> Decimal {
        self.parameters.mode()
    }
}

impl Distribution for GammaDistribution {
    fn probability_density_function(&self) -> &DistributionFunction {
        self.pdf
            .get_or_init(|| Box::new(GammaPdf::new(&self.parameters)) as Box<DistributionFunction>)
            .as_ref()
    }

    fn inverse_probability_density_function(&self) -> &DistributionFunction {
        self.inverse_pdf
            .get_or_init(|| {
                Box::new(GammaInversePdf {
                    parameters: Arc::clone(&self.parameters),
                    config: self.config,
                }) as Box<DistributionFunction>
            })
            .as_ref()
    }

    fn cumulative_density_function(&self) -> &DistributionFunction {
        self.cdf
            .get_or_init(|| Box::new(GammaCdf::new(&self.parameters)) as Box<DistributionFunction>)
            .as_ref()
    }

    fn inverse_cumulative_density_function(&self) -> &DistributionFunction {
        self.inverse_cdf
            .get_or_init(|| {
                Box::new(GammaQuantile {
                    parameters: Arc::clone(&self.parameters),
                    config: self.config,
                }) as Box<DistributionFunction>
            })
            .as_ref()
    }

    /// `αβ`
    fn mean(&self, ctx: &MathContext) -> Result<Decimal, DistributionError> {
        Ok(self.parameters.mean().round(ctx))
    }

    /// `αβ²`
    fn variance(&self, ctx: &MathContext) -> Result<Decimal, DistributionError> {
        let p = &self.parameters;
        Ok((&p.mean() * &p.beta).round(ctx))
    }
}

impl fmt::Debug for GammaDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GammaDistribution")
            .field("alpha", &self.parameters.alpha)
            .field("beta", &self.parameters.beta)
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Debug)]
struct GammaParameters {
    alpha: Decimal,
    beta: Decimal,
    ln_gamma_alpha: Decimal,
    ln_gamma_digits: u64,
}

impl GammaParameters {
    /// Use the stored `ln Γ(α)` when it carries the digits a query at `ctx` needs.
    fn regularization(&self, ctx: &MathContext) -> Regularization {
        if ctx.precision() + 2 * GUARD_DIGITS <= self.ln_gamma_digits {
            Regularization::Precomputed(self.ln_gamma_alpha.clone())
        } else {
            Regularization::Regularized
        }
    }

    fn ln_gamma(&self, ctx: &MathContext) -> Irrational {
        match self.regularization(ctx) {
            Regularization::Precomputed(value) => Irrational::value(value),
            _ => Irrational::value(self.alpha.clone()).ln_gamma(),
        }
    }

    fn mean(&self) -> Decimal {
        &self.alpha * &self.beta
    }

    fn standard_deviation(&self, ctx: &MathContext) -> Result<Decimal, DistributionError> {
        Ok((&elementary::sqrt(&self.alpha, ctx)? * &self.beta).round(ctx))
    }

    fn mode(&self) -> Decimal {
        if self.alpha > Decimal::one() {
            &(&self.alpha - &Decimal::one()) * &self.beta
        } else {
            Decimal::zero()
        }
    }
}

/// `exp(α·ln(x/β) - ln Γ(α) - x/β) / x`
#[derive(Debug, Clone)]
struct GammaPdf {
    parameters: Arc<GammaParameters>,
}

impl GammaPdf {
    fn new(parameters: &Arc<GammaParameters>) -> Self {
        Self {
            parameters: Arc::clone(parameters),
        }
    }
}

impl MathFunction<Decimal> for GammaPdf {
    type Error = DistributionError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        if !x.is_positive() {
            return Ok(Decimal::zero());
        }
        let p = &self.parameters;
        let point = Irrational::value(x.clone());
        let scaled = point.clone() / Irrational::value(p.beta.clone());
        let exponent =
            Irrational::value(p.alpha.clone()) * scaled.clone().ln() - p.ln_gamma(ctx) - scaled;
        Ok((exponent.exp() / point).value_to_precision(ctx)?)
    }
}

impl BoundedMathFunction<Decimal> for GammaPdf {
    fn lower_bound(&self) -> Option<Decimal> {
        Some(Decimal::zero())
    }
}

/// `pdf(x)·((α - 1)/x - 1/β)`
#[derive(Debug, Clone)]
struct GammaPdfDerivative {
    pdf: GammaPdf,
}

impl MathFunction<Decimal> for GammaPdfDerivative {
    type Error = DistributionError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        if !x.is_positive() {
            return Ok(Decimal::zero());
        }
        let p = &self.pdf.parameters;
        let wctx = ctx.widened(GUARD_DIGITS);
        let density = self.pdf.calculate_with(&wctx, x)?;
        let slope = &(&p.alpha - &Decimal::one()).div(x, &wctx)? - &p.beta.recip(&wctx)?;
        Ok((&density * &slope).round(ctx))
    }
}

impl BoundedMathFunction<Decimal> for GammaPdfDerivative {}

/// The density restricted to `[start, ∞)`, where it decreases.
#[derive(Debug, Clone)]
struct DecreasingBranch {
    pdf: GammaPdf,
    start: Decimal,
}

impl MathFunction<Decimal> for DecreasingBranch {
    type Error = DistributionError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        self.pdf.calculate_with(ctx, x)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Decreasing
    }
}

impl BoundedMathFunction<Decimal> for DecreasingBranch {
    fn lower_bound(&self) -> Option<Decimal> {
        Some(self.start.clone())
    }
}

/// `P(α, x/β)`
#[derive(Debug, Clone)]
struct GammaCdf {
    parameters: Arc<GammaParameters>,
}

impl GammaCdf {
    fn new(parameters: &Arc<GammaParameters>) -> Self {
        Self {
            parameters: Arc::clone(parameters),
        }
    }
}

impl MathFunction<Decimal> for GammaCdf {
    type Error = DistributionError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        if !x.is_positive() {
            return Ok(Decimal::zero());
        }
        let p = &self.parameters;
        let scaled = x.div(&p.beta, &ctx.widened(GUARD_DIGITS))?;
        Ok(IncompleteGamma.calculate(ctx, &p.regularization(ctx), &scaled, &p.alpha)?)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Increasing
    }
}

impl BoundedMathFunction<Decimal> for GammaCdf {
    fn lower_bound(&self) -> Option<Decimal> {
        Some(Decimal::zero())
    }
}

/// Confidence level to quantile, solved on `[0, ∞)`.
struct GammaQuantile {
    parameters: Arc<GammaParameters>,
    config: QuantileConfig,
}

impl MathFunction<Decimal> for GammaQuantile {
    type Error = DistributionError;

    #[instrument(level = "debug", skip(self, ctx), fields(precision = ctx.precision()))]
    fn calculate_with(
        &self,
        ctx: &MathContext,
        confidence: &Decimal,
    ) -> Result<Decimal, DistributionError> {
        check_confidence(confidence, true)?;
        if confidence.is_zero() {
            return Ok(Decimal::zero());
        }
        let p = &self.parameters;
        let cdf = GammaCdf::new(p);
        let derivative = GammaPdf::new(p);
        let wctx = ctx.widened(GUARD_DIGITS);
        let upper = &p.mean() + &p.standard_deviation(&wctx)?;
        let initial = Bracket::new(Decimal::zero(), upper)?;
        invert(&cdf, &derivative, confidence, initial, &self.config, ctx)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Increasing
    }
}

impl BoundedMathFunction<Decimal> for GammaQuantile {
    fn lower_bound(&self) -> Option<Decimal> {
        Some(Decimal::zero())
    }

    fn upper_bound(&self) -> Option<Decimal> {
        Some(Decimal::one())
    }
}

/// Density to the argument on the decreasing branch `x ≥ mode`.
struct GammaInversePdf {
    parameters: Arc<GammaParameters>,
    config: QuantileConfig,
}

impl GammaInversePdf {
    /// Halve `upper` until the density there reaches `density`.
    fn lower_point(
        &self,
        pdf: &GammaPdf,
        density: &Decimal,
        upper: &Decimal,
        ctx: &MathContext,
    ) -> Result<Decimal, DistributionError> {
        let half = Decimal::half();
        let mut point = upper.clone();
        for _ in 0..4 * self.config.max_expansions {
            point = &point * &half;
            if pdf.calculate_with(ctx, &point)? >= *density {
                return Ok(point);
            }
        }
        Err(numeric_approx::ApproximationError::InvalidBracket {
            lower: point,
            upper: upper.clone(),
        }
        .into())
    }
}

impl MathFunction<Decimal> for GammaInversePdf {
    type Error = DistributionError;

    #[instrument(level = "debug", skip(self, ctx), fields(precision = ctx.precision()))]
    fn calculate_with(&self, ctx: &MathContext, density: &Decimal) -> Result<Decimal, DistributionError> {
        if !density.is_positive() {
            return Err(DistributionError::InvalidArgument(format!(
                "density {} must be positive",
                density
            )));
        }
        let p = &self.parameters;
        let wctx = ctx.widened(GUARD_DIGITS);
        let pdf = GammaPdf::new(p);
        let mode = p.mode();

        let peak = if p.alpha > Decimal::one() {
            Some(pdf.calculate_with(&wctx, &mode)?)
        } else if p.alpha == Decimal::one() {
            Some(p.beta.recip(&wctx)?)
        } else {
            None
        };
        if let Some(peak) = peak {
            if *density > peak || (*density == peak && mode.is_zero()) {
                return Err(DistributionError::InvalidArgument(format!(
                    "density {} exceeds the maximum {}",
                    density,
                    peak.round(ctx)
                )));
            }
            if *density == peak {
                return Ok(mode.round(ctx));
            }
        }

        let upper = &(&mode + &p.mean()) + &p.standard_deviation(&wctx)?;
        let lower = if mode.is_positive() {
            mode.clone()
        } else {
            self.lower_point(&pdf, density, &upper, &wctx)?
        };
        let branch = DecreasingBranch { pdf, start: mode };
        let derivative = GammaPdfDerivative {
            pdf: branch.pdf.clone(),
        };
        let initial = Bracket::new(lower, upper)?;
        invert(&branch, &derivative, density, initial, &self.config, ctx)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Decreasing
    }
}

impl BoundedMathFunction<Decimal> for GammaInversePdf {
    fn lower_bound(&self) -> Option<Decimal> {
        Some(Decimal::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numeric_core::types::RoundingMode;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ctx30() -> MathContext {
        MathContext::new(30, RoundingMode::HalfEven).unwrap()
    }

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

    fn gamma_2_3() -> GammaDistribution {
        GammaDistribution::with_context(Decimal::from(2), Decimal::from(3), &ctx30()).unwrap()
    }

    #[test]
    fn test_invalid_parameters() {
        let result = GammaDistribution::new(Decimal::zero(), Decimal::one());
        assert!(matches!(
            result,
            Err(DistributionError::InvalidParameter { name: "alpha", .. })
        ));
        let result = GammaDistribution::new(Decimal::one(), dec("-0.5"));
        assert!(matches!(
            result,
            Err(DistributionError::InvalidParameter { name: "beta", .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let dist = gamma_2_3();
        assert_eq!(dist.alpha(), &Decimal::from(2));
        assert_eq!(dist.beta(), &Decimal::from(3));
        // ln Γ(2) = 0
        assert!(dist.ln_gamma_alpha().is_zero());
        assert_eq!(dist.mode(), Decimal::from(3));
        assert_eq!(dist.config(), &QuantileConfig::default());
    }

    #[test]
    fn test_moments() {
        let dist = GammaDistribution::new(dec("0.000841625"), dec("173.0983576")).unwrap();
        let ctx = MathContext::DECIMAL64;
        assert_eq!(dist.mean(&ctx).unwrap(), dec("0.1456839052151"));
        assert_eq!(dist.variance(&ctx).unwrap(), dec("25.21764472148788"));
    }

    #[test]
    fn test_pdf_reference_value() {
        let dist = gamma_2_3();
        let value = dist.pdf(&ctx30(), &Decimal::from(4)).unwrap();
        assert_close(&value, "0.117154283606989675590681753615", 29);
    }

    #[test]
    fn test_pdf_vanishes_off_support() {
        let dist = gamma_2_3();
        assert!(dist.pdf(&ctx30(), &Decimal::zero()).unwrap().is_zero());
        assert!(dist.pdf(&ctx30(), &Decimal::from(-3)).unwrap().is_zero());
    }

    #[test]
    fn test_cdf_reference_value() {
        let dist = gamma_2_3();
        let value = dist.cdf(&ctx30(), &Decimal::from(4)).unwrap();
        assert_close(&value, "0.384940011063304203148920793521", 29);
        assert!(dist.cdf(&ctx30(), &Decimal::zero()).unwrap().is_zero());
    }

    #[test]
    fn test_far_right_tail() {
        let dist = gamma_2_3();
        let ctx = MathContext::DECIMAL64;
        // e^(-x/β) is below anything a decimal exponent can express
        let huge = dec("1e17");
        assert_eq!(dist.cdf(&ctx, &huge).unwrap(), Decimal::one());
        assert!(dist.pdf(&ctx, &huge).unwrap().is_zero());

        // representable but negligible next to one
        let large = dec("1e12");
        assert_eq!(dist.cdf(&ctx, &large).unwrap(), Decimal::one());
        let density = dist.pdf(&ctx, &large).unwrap();
        assert!(density.is_positive());
        assert!(density < Decimal::new(1, -1000));
    }

    #[test]
    fn test_quantile_reference_values() {
        let dist = gamma_2_3();
        let median = dist.quantile(&ctx30(), &dec("0.5")).unwrap();
        assert_close(&median, "5.03504097004998196023865353628", 29);
        let tail = dist.quantile(&ctx30(), &dec("0.99")).unwrap();
        assert_close(&tail, "19.9150562039814368081137182151", 29);
        assert!(dist.quantile(&ctx30(), &Decimal::zero()).unwrap().is_zero());
    }

    #[test]
    fn test_quantile_rejects_invalid_confidence() {
        let dist = gamma_2_3();
        for c in ["1", "1.5", "-0.1"] {
            assert!(matches!(
                dist.quantile(&ctx30(), &dec(c)),
                Err(DistributionError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_quantile_with_zero_budget_fails() {
        let dist = gamma_2_3().with_config(QuantileConfig {
            max_iterations: 0,
            warmup_iterations: 0,
            ..QuantileConfig::default()
        });
        let result = dist.quantile(&ctx30(), &dec("0.5"));
        assert!(matches!(
            result,
            Err(DistributionError::Approximation(
                numeric_approx::ApproximationError::NonConvergence { iterations: 0, .. }
            ))
        ));
    }

    #[test]
    fn test_inverse_pdf_right_of_mode() {
        let dist = gamma_2_3();
        let x = dist.inverse_pdf(&ctx30(), &dec("0.05")).unwrap();
        assert_close(&x, "8.98078496032313360063247717914", 29);
        assert!(x > dist.mode());
    }

    #[test]
    fn test_inverse_pdf_without_interior_mode() {
        let dist =
            GammaDistribution::with_context(dec("0.5"), Decimal::from(2), &ctx30()).unwrap();
        let x = dist.inverse_pdf(&ctx30(), &dec("0.1")).unwrap();
        assert_close(&x, "2.04963257446210359808960063372", 29);

        let exponential =
            GammaDistribution::with_context(Decimal::one(), Decimal::from(2), &ctx30()).unwrap();
        let x = exponential.inverse_pdf(&ctx30(), &dec("0.25")).unwrap();
        // -β ln(yβ)
        assert_close(&x, "1.38629436111989061883446424292", 29);
    }

    #[test]
    fn test_inverse_pdf_at_and_above_peak() {
        let dist = gamma_2_3();
        let ctx = ctx30();
        let peak = dist.pdf(&ctx.widened(GUARD_DIGITS), &dist.mode()).unwrap();
        assert_eq!(dist.inverse_pdf(&ctx, &peak).unwrap(), Decimal::from(3));
        assert!(matches!(
            dist.inverse_pdf(&ctx, &dec("0.2")),
            Err(DistributionError::InvalidArgument(_))
        ));
        assert!(matches!(
            dist.inverse_pdf(&ctx, &Decimal::zero()),
            Err(DistributionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cached_functions_are_reused() {
        let dist = gamma_2_3();
        let first = dist.cumulative_density_function() as *const DistributionFunction as *const ();
        let second = dist.cumulative_density_function() as *const DistributionFunction as *const ();
        assert_eq!(first, second);
        assert_eq!(dist.cumulative_density_function().monotonicity(), Monotonicity::Increasing);
        assert_eq!(
            dist.inverse_cumulative_density_function().upper_bound(),
            Some(Decimal::one())
        );
    }

    #[test]
    fn test_precision_beyond_precomputed_ln_gamma() {
        let coarse = GammaDistribution::with_context(
            dec("2.5"),
            Decimal::from(3),
            &MathContext::DECIMAL32,
        )
        .unwrap();
        let fine =
            GammaDistribution::with_context(dec("2.5"), Decimal::from(3), &ctx30()).unwrap();
        let ctx = ctx30();
        let x = Decimal::from(4);
        let fine_value = fine.cdf(&ctx, &x).unwrap();
        assert_close(&coarse.cdf(&ctx, &x).unwrap(), &fine_value.to_string(), 29);
    }
}
