//! Normal distribution.

use std::fmt;
use std::sync::{Arc, OnceLock};

use numeric_approx::Bracket;
use numeric_core::math::{Irrational, GUARD_DIGITS};
use numeric_core::traits::{BoundedMathFunction, MathFunction, Monotonicity};
use numeric_core::types::{Decimal, MathContext};
use tracing::{debug, instrument};

use crate::algorithms::{AlgorithmStrategy, IncompleteGamma, Regularization};
use crate::distributions::{
    check_confidence, invert, Distribution, DistributionFunction, QuantileConfig,
};
use crate::error::DistributionError;

/// Normal distribution `N(μ, σ²)`.
///
/// The CDF goes through the incomplete gamma function:
///
/// ```text
/// Φ(z) = ½ + ½ P(½, z²/2)    for z ≥ 0
/// Φ(z) = ½ Q(½, z²/2)        for z < 0
/// ```
///
/// so the lower tail keeps full relative precision.
///
/// # Examples
/// ```
/// use numeric_core::types::MathContext;
/// use numeric_models::distributions::{Distribution, NormalDistribution};
///
/// let dist = NormalDistribution::standard();
/// let ctx = MathContext::working(20);
/// let p = dist.cdf(&ctx, &"1.96".parse().unwrap()).unwrap();
/// assert_eq!(p.to_string(), "0.97500210485177956586");
/// ```
pub struct NormalDistribution {
    parameters: Arc<NormalParameters>,
    config: QuantileConfig,
    pdf: OnceLock<Box<DistributionFunction>>,
    inverse_pdf: OnceLock<Box<DistributionFunction>>,
    cdf: OnceLock<Box<DistributionFunction>>,
    inverse_cdf: OnceLock<Box<DistributionFunction>>,
}

impl NormalDistribution {
    /// # Errors
    /// `DistributionError::InvalidParameter` unless `standard_deviation > 0`.
    pub fn new(mean: Decimal, standard_deviation: Decimal) -> Result<Self, DistributionError> {
        if !standard_deviation.is_positive() {
            return Err(DistributionError::InvalidParameter {
                name: "standard_deviation",
                value: standard_deviation,
                reason: "must be positive",
            });
        }
        debug!(%mean, %standard_deviation, "normal distribution created");
        Ok(Self::from_parameters(NormalParameters {
            mean,
            standard_deviation,
        }))
    }

    /// `N(0, 1)`.
    pub fn standard() -> Self {
        Self::from_parameters(NormalParameters {
            mean: Decimal::zero(),
            standard_deviation: Decimal::one(),
        })
    }

    fn from_parameters(parameters: NormalParameters) -> Self {
        Self {
            parameters: Arc::new(parameters),
            config: QuantileConfig::default(),
            pdf: OnceLock::new(),
            inverse_pdf: OnceLock::new(),
            cdf: OnceLock::new(),
            inverse_cdf: OnceLock::new(),
        }
    }

    /// Replace the budgets used by the quantile function.
    pub fn with_config(mut self, config: QuantileConfig) -> Self {
        self.config = config;
        self.inverse_cdf = OnceLock::new();
        self
    }

    pub fn location(&self) -> &Decimal {
        &self.parameters.mean
    }

    pub fn scale(&self) -> &Decimal {
        &self.parameters.standard_deviation
    }
}

impl Distribution for NormalDistribution {
    fn probability_density_function(&self) -> &DistributionFunction {
        self.pdf
            .get_or_init(|| Box::new(NormalPdf::new(&self.parameters)) as Box<DistributionFunction>)
            .as_ref()
    }

    fn inverse_probability_density_function(&self) -> &DistributionFunction {
        self.inverse_pdf
            .get_or_init(|| {
                Box::new(NormalInversePdf {
                    parameters: Arc::clone(&self.parameters),
                }) as Box<DistributionFunction>
            })
            .as_ref()
    }

    fn cumulative_density_function(&self) -> &DistributionFunction {
        self.cdf
            .get_or_init(|| Box::new(NormalCdf::new(&self.parameters)) as Box<DistributionFunction>)
            .as_ref()
    }

    fn inverse_cumulative_density_function(&self) -> &DistributionFunction {
        self.inverse_cdf
            .get_or_init(|| {
                Box::new(NormalQuantile {
                    parameters: Arc::clone(&self.parameters),
                    config: self.config,
                }) as Box<DistributionFunction>
            })
            .as_ref()
    }

    fn mean(&self, ctx: &MathContext) -> Result<Decimal, DistributionError> {
        Ok(self.parameters.mean.round(ctx))
    }

    fn variance(&self, ctx: &MathContext) -> Result<Decimal, DistributionError> {
        let sd = &self.parameters.standard_deviation;
        Ok((sd * sd).round(ctx))
    }
}

impl fmt::Debug for NormalDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalDistribution")
            .field("mean", &self.parameters.mean)
            .field("standard_deviation", &self.parameters.standard_deviation)
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Debug)]
struct NormalParameters {
    mean: Decimal,
    standard_deviation: Decimal,
}

impl NormalParameters {
    /// `σ√(2π)` as an expression.
    fn normalisation(&self) -> Irrational {
        Irrational::value(self.standard_deviation.clone())
            * (Irrational::from(2) * Irrational::pi()).sqrt()
    }
}

/// `exp(-z²/2) / (σ√(2π))`
#[derive(Debug, Clone)]
struct NormalPdf {
    parameters: Arc<NormalParameters>,
}

impl NormalPdf {
    fn new(parameters: &Arc<NormalParameters>) -> Self {
        Self {
            parameters: Arc::clone(parameters),
        }
    }
}

impl MathFunction<Decimal> for NormalPdf {
    type Error = DistributionError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        let p = &self.parameters;
        let z = (Irrational::value(x.clone()) - Irrational::value(p.mean.clone()))
            / Irrational::value(p.standard_deviation.clone());
        let exponent = -(z.clone() * z) / Irrational::from(2);
        Ok((exponent.exp() / p.normalisation()).value_to_precision(ctx)?)
    }
}

impl BoundedMathFunction<Decimal> for NormalPdf {}

/// `Φ((x - μ)/σ)`
#[derive(Debug, Clone)]
struct NormalCdf {
    parameters: Arc<NormalParameters>,
}

impl NormalCdf {
    fn new(parameters: &Arc<NormalParameters>) -> Self {
        Self {
            parameters: Arc::clone(parameters),
        }
    }
}

impl MathFunction<Decimal> for NormalCdf {
    type Error = DistributionError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, DistributionError> {
        let p = &self.parameters;
        let wctx = ctx.widened(GUARD_DIGITS);
        let half = Decimal::half();
        let z = (x - &p.mean).div(&p.standard_deviation, &wctx)?;
        if z.is_zero() {
            return Ok(half.round(ctx));
        }
        let argument = (&(&z * &z) * &half).round(&wctx);
        // ln Γ(½) = ½ ln π
        let ln_gamma_half = (Irrational::pi().ln() / Irrational::from(2))
            .value_to_precision(&wctx.widened(2 * GUARD_DIGITS))?;
        let regularization = Regularization::Precomputed(ln_gamma_half);
        let value = if z.is_positive() {
            let p = IncompleteGamma.calculate(&wctx, &regularization, &argument, &half)?;
            &half + &(&half * &p)
        } else {
            let q =
                IncompleteGamma.calculate_complement(&wctx, &regularization, &argument, &half)?;
            &half * &q
        };
        Ok(value.round(ctx))
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Increasing
    }
}

impl BoundedMathFunction<Decimal> for NormalCdf {}

/// Confidence level to quantile, bracketed from `[μ - σ, μ + σ]`.
struct NormalQuantile {
    parameters: Arc<NormalParameters>,
    config: QuantileConfig,
}

impl MathFunction<Decimal> for NormalQuantile {
    type Error = DistributionError;

    #[instrument(level = "debug", skip(self, ctx), fields(precision = ctx.precision()))]
    fn calculate_with(
        &self,
        ctx: &MathContext,
        confidence: &Decimal,
    ) -> Result<Decimal, DistributionError> {
        check_confidence(confidence, false)?;
        let p = &self.parameters;
        if *confidence == Decimal::half() {
            return Ok(p.mean.round(ctx));
        }
        let cdf = NormalCdf::new(p);
        let derivative = NormalPdf::new(p);
        let initial = Bracket::new(
            &p.mean - &p.standard_deviation,
            &p.mean + &p.standard_deviation,
        )?;
        invert(&cdf, &derivative, confidence, initial, &self.config, ctx)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Increasing
    }
}

impl BoundedMathFunction<Decimal> for NormalQuantile {
    fn lower_bound(&self) -> Option<Decimal> {
        Some(Decimal::zero())
    }

    fn upper_bound(&self) -> Option<Decimal> {
        Some(Decimal::one())
    }
}

/// `μ + σ√(-2 ln(y σ√(2π)))`, the solution right of the mean.
struct NormalInversePdf {
    parameters: Arc<NormalParameters>,
}

impl MathFunction<Decimal> for NormalInversePdf {
    type Error = DistributionError;

    fn calculate_with(
        &self,
        ctx: &MathContext,
        density: &Decimal,
    ) -> Result<Decimal, DistributionError> {
        if !density.is_positive() {
            return Err(DistributionError::InvalidArgument(format!(
                "density {} must be positive",
                density
            )));
        }
        let p = &self.parameters;
        let wctx = ctx.widened(GUARD_DIGITS);
        let scaled = Irrational::value(density.clone()) * p.normalisation();
        let log = scaled.clone().ln().value_to_precision(&wctx)?;
        if log.is_positive() {
            return Err(DistributionError::InvalidArgument(format!(
                "density {} exceeds the maximum of the normal density",
                density
            )));
        }
        if log.is_zero() {
            return Ok(p.mean.round(ctx));
        }
        let distance = (Irrational::from(-2) * scaled.ln()).sqrt();
        let x = Irrational::value(p.mean.clone())
            + Irrational::value(p.standard_deviation.clone()) * distance;
        Ok(x.value_to_precision(ctx)?)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Decreasing
    }
}

impl BoundedMathFunction<Decimal> for NormalInversePdf {
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

    #[test]
    fn test_invalid_standard_deviation() {
        assert!(matches!(
            NormalDistribution::new(Decimal::zero(), Decimal::zero()),
            Err(DistributionError::InvalidParameter {
                name: "standard_deviation",
                ..
            })
        ));
    }

    #[test]
    fn test_standard_pdf() {
        let dist = NormalDistribution::standard();
        let ctx = ctx30();
        assert_close(
            &dist.pdf(&ctx, &Decimal::zero()).unwrap(),
            "0.398942280401432677939946059934",
            29,
        );
        assert_close(
            &dist.pdf(&ctx, &Decimal::one()).unwrap(),
            "0.241970724519143349797830192936",
            29,
        );
        assert_eq!(
            dist.pdf(&ctx, &dec("-1")).unwrap(),
            dist.pdf(&ctx, &Decimal::one()).unwrap()
        );
    }

    #[test]
    fn test_standard_cdf() {
        let dist = NormalDistribution::standard();
        let ctx = ctx30();
        assert_eq!(dist.cdf(&ctx, &Decimal::zero()).unwrap(), dec("0.5"));
        assert_close(
            &dist.cdf(&ctx, &dec("1.96")).unwrap(),
            "0.975002104851779565863415730959",
            29,
        );
        assert_close(
            &dist.cdf(&ctx, &dec("-3")).unwrap(),
            "0.00134989803163009452665181476759",
            29,
        );
        // the lower tail keeps its relative precision
        assert_close(
            &dist.cdf(&ctx, &dec("-10")).unwrap(),
            "7.61985302416052606597334325160e-24",
            29,
        );
    }

    #[test]
    fn test_far_tails() {
        let dist = NormalDistribution::standard();
        let ctx = MathContext::DECIMAL64;
        assert_eq!(dist.cdf(&ctx, &dec("2e8")).unwrap(), Decimal::one());
        assert!(dist.cdf(&ctx, &dec("-2e8")).unwrap().is_zero());
        assert!(dist.pdf(&ctx, &dec("2e8")).unwrap().is_zero());

        assert_eq!(dist.cdf(&ctx, &dec("1e5")).unwrap(), Decimal::one());
        let tail = dist.cdf(&ctx, &dec("-1e5")).unwrap();
        assert!(tail.is_positive());
        assert!(tail < Decimal::new(1, -1_000_000));
    }

    #[test]
    fn test_shifted_and_scaled() {
        let dist = NormalDistribution::new(Decimal::from(10), Decimal::from(2)).unwrap();
        let ctx = ctx30();
        assert_close(
            &dist.cdf(&ctx, &Decimal::from(13)).unwrap(),
            "0.933192798731141933995505959020",
            29,
        );
        assert_close(
            &dist.pdf(&ctx, &Decimal::from(13)).unwrap(),
            "0.0647587978329458638070497789774",
            29,
        );
        assert_eq!(dist.mean(&ctx).unwrap(), Decimal::from(10));
        assert_eq!(dist.variance(&ctx).unwrap(), Decimal::from(4));
        assert_eq!(dist.location(), &Decimal::from(10));
        assert_eq!(dist.scale(), &Decimal::from(2));
    }

    #[test]
    fn test_quantile() {
        let dist = NormalDistribution::standard();
        let ctx = ctx30();
        assert_close(
            &dist.quantile(&ctx, &dec("0.975")).unwrap(),
            "1.95996398454005423552459443052",
            29,
        );
        assert_close(
            &dist.quantile(&ctx, &dec("0.01")).unwrap(),
            "-2.32634787404084110088560616335",
            29,
        );
        assert!(dist.quantile(&ctx, &dec("0.5")).unwrap().is_zero());
    }

    #[test]
    fn test_quantile_rejects_closed_ends() {
        let dist = NormalDistribution::standard();
        for c in ["0", "1", "-0.5"] {
            assert!(matches!(
                dist.quantile(&ctx30(), &dec(c)),
                Err(DistributionError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_inverse_pdf() {
        let dist = NormalDistribution::standard();
        let ctx = ctx30();
        assert_close(
            &dist.inverse_pdf(&ctx, &dec("0.2")).unwrap(),
            "1.17515903539004254453471738278",
            29,
        );
        assert!(matches!(
            dist.inverse_pdf(&ctx, &dec("0.5")),
            Err(DistributionError::InvalidArgument(_))
        ));
        assert!(matches!(
            dist.inverse_pdf(&ctx, &Decimal::zero()),
            Err(DistributionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_inverse_pdf_undoes_pdf() {
        let dist = NormalDistribution::new(dec("-1.5"), dec("0.25")).unwrap();
        let ctx = MathContext::DECIMAL64;
        let x = dec("-1.2");
        let density = dist.pdf(&ctx.widened(GUARD_DIGITS), &x).unwrap();
        let back = dist.inverse_pdf(&ctx, &density).unwrap();
        assert_close(&back, "-1.2", 14);
    }
}
