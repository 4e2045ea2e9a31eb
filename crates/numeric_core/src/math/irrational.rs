//! Lazily evaluated real-number expressions.
//!
//! An [`Irrational`] records how a value is built from exact inputs, π and
//! the functions of [`elementary`] and [`gamma`](crate::math::gamma). Nothing
//! is computed until [`Irrational::value_to_precision`] is called; the
//! evaluator then chooses the digits each sub-expression needs and rounds the
//! final result once.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use tracing::trace;

use crate::math::elementary::{self, digits_of, GUARD_DIGITS};
use crate::math::gamma;
use crate::types::{Decimal, ExactRational, MathContext, NumericError};

const MAX_CANCELLATION_RETRIES: usize = 6;

/// Expression tree over exact values and transcendental functions.
///
/// # Examples
/// ```
/// use numeric_core::math::Irrational;
/// use numeric_core::types::{Decimal, MathContext};
///
/// // e^(ln 2) - 2 cancels completely
/// let two = Irrational::from(2);
/// let expr = two.clone().ln().exp() - two;
/// let value = expr.value_to_precision(&MathContext::DECIMAL64).unwrap();
/// assert_eq!(value, Decimal::zero());
///
/// // √π to 20 digits
/// let root_pi = Irrational::pi().sqrt();
/// assert_eq!(
///     root_pi.value_to_precision(&MathContext::working(20)).unwrap().to_string(),
///     "1.7724538509055160273"
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Irrational {
    Value(Decimal),
    Rational(ExactRational),
    Pi,
    Neg(Box<Irrational>),
    Add(Box<Irrational>, Box<Irrational>),
    Sub(Box<Irrational>, Box<Irrational>),
    Mul(Box<Irrational>, Box<Irrational>),
    Div(Box<Irrational>, Box<Irrational>),
    Ln(Box<Irrational>),
    Exp(Box<Irrational>),
    Sqrt(Box<Irrational>),
    Pow(Box<Irrational>, Box<Irrational>),
    Gamma(Box<Irrational>),
    LnGamma(Box<Irrational>),
}

impl Irrational {
    pub fn value(value: Decimal) -> Self {
        Irrational::Value(value)
    }

    pub fn rational(value: ExactRational) -> Self {
        Irrational::Rational(value)
    }

    pub fn pi() -> Self {
        Irrational::Pi
    }

    pub fn ln(self) -> Self {
        Irrational::Ln(Box::new(self))
    }

    pub fn exp(self) -> Self {
        Irrational::Exp(Box::new(self))
    }

    pub fn sqrt(self) -> Self {
        Irrational::Sqrt(Box::new(self))
    }

    pub fn pow(self, exponent: Irrational) -> Self {
        Irrational::Pow(Box::new(self), Box::new(exponent))
    }

    pub fn gamma(self) -> Self {
        Irrational::Gamma(Box::new(self))
    }

    pub fn ln_gamma(self) -> Self {
        Irrational::LnGamma(Box::new(self))
    }

    /// Materialise the expression under `ctx`, rounding once.
    ///
    /// # Errors
    /// Any error of the functions involved (domain, pole, division by zero,
    /// overflow).
    pub fn value_to_precision(&self, ctx: &MathContext) -> Result<Decimal, NumericError> {
        Ok(self.evaluate(ctx.precision() + GUARD_DIGITS)?.round(ctx))
    }

    /// `true` if evaluation involves no rounding at all.
    pub fn is_exact(&self) -> bool {
        match self {
            Irrational::Value(_) => true,
            Irrational::Neg(a) => a.is_exact(),
            Irrational::Add(a, b) | Irrational::Sub(a, b) | Irrational::Mul(a, b) => {
                a.is_exact() && b.is_exact()
            }
            _ => false,
        }
    }

    /// Value to about `wp` significant digits.
    fn evaluate(&self, wp: u64) -> Result<Decimal, NumericError> {
        let wctx = MathContext::working(wp);
        match self {
            Irrational::Value(value) => Ok(value.clone()),
            Irrational::Rational(value) => Ok(value.decimal_value(&wctx)),
            Irrational::Pi => Ok(elementary::pi(&wctx)),
            Irrational::Neg(a) => Ok(-a.evaluate(wp)?),
            Irrational::Add(a, b) => evaluate_sum(a, b, false, wp),
            Irrational::Sub(a, b) => evaluate_sum(a, b, true, wp),
            Irrational::Mul(a, b) => {
                let product = &a.evaluate(wp + 1)? * &b.evaluate(wp + 1)?;
                Ok(product.round(&wctx))
            }
            Irrational::Div(a, b) => a.evaluate(wp + 1)?.div(&b.evaluate(wp + 1)?, &wctx),
            Irrational::Ln(a) => {
                let argument = ln_argument(a, wp)?;
                elementary::ln(&argument, &wctx)
            }
            Irrational::Exp(a) => {
                // the absolute error of the argument is the relative error of exp
                let argument = with_magnitude_headroom(a, wp)?;
                elementary::exp(&argument, &wctx)
            }
            Irrational::Sqrt(a) => elementary::sqrt(&a.evaluate(wp + 1)?, &wctx),
            Irrational::Pow(base, exponent) => {
                let base_value = base.evaluate(wp + 1)?;
                let ln_digits = digits_of(base_value.adjusted_exponent().unsigned_abs()) + 1;
                let exponent_value = with_magnitude_headroom(exponent, wp + ln_digits)?;
                let base_value = if base.is_exact() {
                    base_value
                } else {
                    let extra = (exponent_value.adjusted_exponent() + 1).max(0) as u64;
                    base.evaluate(wp + extra + 1)?
                };
                elementary::pow(&base_value, &exponent_value, &wctx)
            }
            Irrational::Gamma(a) => {
                let argument = with_magnitude_headroom(a, wp + 2)?;
                gamma::gamma(&argument, &wctx)
            }
            Irrational::LnGamma(a) => {
                let argument = with_magnitude_headroom(a, wp + 2)?;
                gamma::ln_gamma(&argument, &wctx)
            }
        }
    }
}

/// Evaluate `a` with enough digits that its absolute error stays below
/// `10^-wp`.
fn with_magnitude_headroom(a: &Irrational, wp: u64) -> Result<Decimal, NumericError> {
    let first = a.evaluate(wp)?;
    if a.is_exact() || first.is_zero() {
        return Ok(first);
    }
    let magnitude = first.adjusted_exponent() + 1;
    if magnitude <= 0 {
        return Ok(first);
    }
    a.evaluate(wp + magnitude as u64)
}

/// Argument of `ln`, evaluated until its distance from one is known to `wp`
/// significant digits.
///
/// An argument that rounds to exactly one is re-evaluated with more digits
/// before it is accepted as one.
fn ln_argument(a: &Irrational, wp: u64) -> Result<Decimal, NumericError> {
    let mut digits = wp + 1;
    let mut argument = a.evaluate(digits)?;
    if a.is_exact() {
        return Ok(argument);
    }
    for _ in 0..MAX_CANCELLATION_RETRIES {
        let distance = &argument - &Decimal::one();
        let needed = if distance.is_zero() {
            digits + wp
        } else if distance.adjusted_exponent() < 0 {
            wp + distance.adjusted_exponent().unsigned_abs() + 1
        } else {
            return Ok(argument);
        };
        if needed <= digits {
            return Ok(argument);
        }
        digits = needed;
        trace!(precision = digits, "ln argument near one, widening");
        argument = a.evaluate(digits)?;
    }
    Ok(argument)
}

/// `a ± b`, re-evaluated with more digits while leading digits cancel.
fn evaluate_sum(
    a: &Irrational,
    b: &Irrational,
    subtract: bool,
    wp: u64,
) -> Result<Decimal, NumericError> {
    let combine = |x: &Decimal, y: &Decimal| if subtract { x - y } else { x + y };
    if a.is_exact() && b.is_exact() {
        return Ok(combine(&a.evaluate(wp)?, &b.evaluate(wp)?));
    }

    let wctx = MathContext::working(wp);
    let mut digits = wp;
    let mut result = Decimal::zero();
    let mut within_noise = false;
    for _ in 0..MAX_CANCELLATION_RETRIES {
        let x = a.evaluate(digits)?;
        let y = b.evaluate(digits)?;
        result = combine(&x, &y);
        let scale = [&x, &y]
            .iter()
            .filter(|v| !v.is_zero())
            .map(|v| v.adjusted_exponent())
            .max();
        let Some(scale) = scale else {
            return Ok(result);
        };
        let lost = if result.is_zero() {
            digits
        } else {
            (scale - result.adjusted_exponent()).max(0) as u64
        };
        if digits >= wp + lost {
            return Ok(result.round(&wctx));
        }
        within_noise = lost + 2 >= digits;
        digits = (wp + lost + 1).max(digits + 1);
        trace!(lost, precision = digits, "cancellation, widening");
    }
    if within_noise {
        // indistinguishable from zero at every precision tried
        return Ok(Decimal::zero());
    }
    Ok(result.round(&wctx))
}

impl From<Decimal> for Irrational {
    fn from(value: Decimal) -> Self {
        Irrational::Value(value)
    }
}

impl From<ExactRational> for Irrational {
    fn from(value: ExactRational) -> Self {
        Irrational::Rational(value)
    }
}

impl From<i64> for Irrational {
    fn from(value: i64) -> Self {
        Irrational::Value(Decimal::from(value))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl $trait for Irrational {
            type Output = Irrational;

            fn $method(self, rhs: Irrational) -> Irrational {
                Irrational::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);

impl Neg for Irrational {
    type Output = Irrational;

    fn neg(self) -> Irrational {
        Irrational::Neg(Box::new(self))
    }
}

impl fmt::Display for Irrational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Irrational::Value(v) => write!(f, "{}", v),
            Irrational::Rational(r) => write!(f, "{}", r),
            Irrational::Pi => f.write_str("π"),
            Irrational::Neg(a) => write!(f, "-{}", a),
            Irrational::Add(a, b) => write!(f, "({} + {})", a, b),
            Irrational::Sub(a, b) => write!(f, "({} - {})", a, b),
            Irrational::Mul(a, b) => write!(f, "{} * {}", a, b),
            Irrational::Div(a, b) => write!(f, "{} / {}", a, b),
            Irrational::Ln(a) => write!(f, "ln({})", a),
            Irrational::Exp(a) => write!(f, "exp({})", a),
            Irrational::Sqrt(a) => write!(f, "sqrt({})", a),
            Irrational::Pow(a, b) => write!(f, "{}^{}", a, b),
            Irrational::Gamma(a) => write!(f, "Γ({})", a),
            Irrational::LnGamma(a) => write!(f, "lnΓ({})", a),
        }
    }
}
