//! Elementary functions on [`Decimal`] values.
//!
//! Every function evaluates with [`GUARD_DIGITS`] extra digits (plus
//! function-specific headroom) and rounds exactly once under the caller's
//! [`MathContext`].
//!
//! ## Algorithms
//! - `exp`: argument halving, Taylor series, repeated squaring
//! - `ln`: split off the decimal exponent, Halley iteration on `exp`
//! - `sqrt`: integer square root with a sticky digit (correctly rounded)
//! - `powi`: binary exponentiation
//! - `pow`: `powi` for integral exponents, `exp(y·ln x)` otherwise
//! - `pi`: Machin's formula in fixed point

use num_bigint::BigInt;
use num_traits::Zero;
use tracing::trace;

use crate::types::decimal::pow10;
use crate::types::{Decimal, MathContext, NumericError};

/// Extra digits carried by every intermediate computation.
pub const GUARD_DIGITS: u64 = 10;

const MAX_SERIES_TERMS: usize = 100_000;
const MAX_HALLEY_ITERATIONS: usize = 64;

/// Largest adjusted exponent accepted by `exp` (arguments below 10^16).
const MAX_EXP_ADJUSTED_EXPONENT: i64 = 15;

/// Integral powers whose decimal exponent could exceed this go through
/// `exp(n·ln|x|)`, which reports overflow instead of growing unbounded.
const MAX_BINARY_POWER_SCALE: u64 = 100_000_000_000_000_000;

/// Number of decimal digits of `n`.
pub(crate) fn digits_of(n: u64) -> u64 {
    n.checked_ilog10().map_or(1, |d| d as u64 + 1)
}

/// Exponential function.
///
/// Arguments at or below `-10^16` underflow to zero.
///
/// # Errors
/// `NumericError::Overflow` if `x >= 10^16`.
///
/// # Examples
/// ```
/// use numeric_core::math::elementary::exp;
/// use numeric_core::types::{Decimal, MathContext};
///
/// let e = exp(&Decimal::one(), &MathContext::DECIMAL64).unwrap();
/// assert_eq!(e.to_string(), "2.718281828459045");
/// ```
pub fn exp(x: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    Ok(exp_working(x, ctx.precision() + GUARD_DIGITS)?.round(ctx))
}

/// `exp(x)` to about `wp` significant digits, unrounded.
pub(crate) fn exp_working(x: &Decimal, wp: u64) -> Result<Decimal, NumericError> {
    if x.is_zero() {
        return Ok(Decimal::one());
    }
    if x.adjusted_exponent() > MAX_EXP_ADJUSTED_EXPONENT {
        if x.is_negative() {
            // below 10^(-4·10^15): flushed to zero
            trace!(argument = %x, "exp underflow");
            return Ok(Decimal::zero());
        }
        return Err(NumericError::Overflow {
            function: "exp",
            argument: x.to_string(),
        });
    }
    if x.is_negative() {
        let positive = exp_working(&x.abs(), wp + 1)?;
        return positive.recip(&MathContext::working(wp));
    }

    // Halve until the argument is below 2^-8; every squaring doubles the
    // relative error, so one digit is added per three halvings.
    let magnitude_bits = ((x.adjusted_exponent() + 1).max(0) as f64 * std::f64::consts::LOG2_10)
        .ceil() as u64;
    let halvings = magnitude_bits + 8;
    let wp = wp + halvings / 3 + 1;
    let wctx = MathContext::working(wp);

    // x / 2^k == x·5^k / 10^k exactly
    let five_pow = BigInt::from(5u32).pow(halvings as u32);
    let reduced = Decimal::new(x.mantissa() * five_pow, x.exponent() - halvings as i64).round(&wctx);

    let mut sum = Decimal::one();
    let mut term = Decimal::one();
    let mut converged = false;
    for n in 1..=MAX_SERIES_TERMS {
        term = (&term * &reduced).div(&Decimal::from(n), &wctx)?;
        sum = (&sum + &term).round(&wctx);
        if term.is_zero() || term.adjusted_exponent() < sum.adjusted_exponent() - wp as i64 - 1 {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(NumericError::NonConvergence {
            function: "exp",
            iterations: MAX_SERIES_TERMS,
        });
    }

    for _ in 0..halvings {
        sum = (&sum * &sum).round(&wctx);
    }
    Ok(sum)
}

/// Natural logarithm.
///
/// # Errors
/// `NumericError::Domain` for `x <= 0`.
pub fn ln(x: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    Ok(ln_working(x, ctx.precision() + GUARD_DIGITS)?.round(ctx))
}

/// `ln(x)` to about `wp` significant digits, unrounded.
pub(crate) fn ln_working(x: &Decimal, wp: u64) -> Result<Decimal, NumericError> {
    if !x.is_positive() {
        return Err(NumericError::Domain {
            function: "ln",
            argument: x.to_string(),
        });
    }
    let one = Decimal::one();
    if *x == one {
        return Ok(Decimal::zero());
    }

    let distance = x - &one;
    if distance.abs() < Decimal::half() {
        // ln(x) ~ x - 1: absolute accuracy must cover the leading zeros
        let extra = (-distance.adjusted_exponent()).max(0) as u64;
        return halley_ln(x, wp + extra);
    }

    // x = m·10^e with m in [1, 10)
    let exponent = x.adjusted_exponent();
    let mantissa = x.scale_by_power_of_ten(-exponent);
    let wp = wp + digits_of(exponent.unsigned_abs()) + 1;
    let head = halley_ln(&mantissa, wp)?;
    if exponent == 0 {
        return Ok(head);
    }
    let ln_ten = halley_ln(&Decimal::from(10), wp)?;
    Ok((&head + &(&ln_ten * &Decimal::from(exponent))).round(&MathContext::working(wp)))
}

/// Halley iteration `y += 2(m - e^y)/(m + e^y)` for moderate positive `m`.
///
/// Stops once the correction is below `10^(2 - wp)` in absolute terms.
fn halley_ln(m: &Decimal, wp: u64) -> Result<Decimal, NumericError> {
    let wctx = MathContext::working(wp);
    let two = Decimal::from(2);
    let tolerance = 2 - wp as i64;

    let mut y = Decimal::try_from(m.to_f64().ln()).unwrap_or_else(|_| Decimal::zero());
    for iteration in 1..=MAX_HALLEY_ITERATIONS {
        let exp_y = exp_working(&y, wp)?;
        let correction = (&(m - &exp_y) * &two).div(&(m + &exp_y), &wctx)?;
        y = (&y + &correction).round(&wctx);
        if correction.is_zero() || correction.adjusted_exponent() < tolerance {
            trace!(iteration, precision = wp, "ln converged");
            return Ok(y);
        }
    }
    Err(NumericError::NonConvergence {
        function: "ln",
        iterations: MAX_HALLEY_ITERATIONS,
    })
}

/// Square root, correctly rounded under `ctx`.
///
/// # Errors
/// `NumericError::Domain` for negative `x`.
pub fn sqrt(x: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    if x.is_negative() {
        return Err(NumericError::Domain {
            function: "sqrt",
            argument: x.to_string(),
        });
    }
    if x.is_zero() {
        return Ok(Decimal::zero());
    }

    // Enough zeros for p + 2 root digits, keeping the exponent even
    let root_digits = ctx.precision() + 2;
    let mut shift = (2 * root_digits).saturating_sub(x.digit_count());
    if (x.exponent() - shift as i64).rem_euclid(2) != 0 {
        shift += 1;
    }
    let scaled = x.mantissa() * pow10(shift);
    let root = scaled.sqrt();
    let exponent = (x.exponent() - shift as i64) / 2;

    let value = if &root * &root == scaled {
        Decimal::new(root, exponent)
    } else {
        // sticky digit: the true root lies strictly above the truncation
        Decimal::new(root * 10 + 1, exponent - 1)
    };
    Ok(value.round(ctx))
}

/// `base^n` for an integral exponent.
///
/// `0^0` is one.
///
/// # Errors
/// `NumericError::DivisionByZero` for a zero base with negative `n`.
pub fn powi(base: &Decimal, n: i64, ctx: &MathContext) -> Result<Decimal, NumericError> {
    if n == 0 {
        return Ok(Decimal::one().round(ctx));
    }
    if base.is_zero() {
        return if n < 0 {
            Err(NumericError::DivisionByZero)
        } else {
            Ok(Decimal::zero())
        };
    }
    let magnitude = n.unsigned_abs();
    let scale = (base.adjusted_exponent().unsigned_abs() + 1).saturating_mul(magnitude);
    if scale > MAX_BINARY_POWER_SCALE && base.abs() != Decimal::one() {
        let value = exp_of_product(&base.abs(), &Decimal::from(n), ctx)?;
        return Ok(if base.is_negative() && magnitude % 2 == 1 {
            -value
        } else {
            value
        });
    }

    let wctx = ctx.widened(GUARD_DIGITS + digits_of(magnitude));
    let mut result = Decimal::one();
    let mut square = base.round(&wctx);
    let mut remaining = magnitude;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = (&result * &square).round(&wctx);
        }
        remaining >>= 1;
        if remaining > 0 {
            square = (&square * &square).round(&wctx);
        }
    }
    if n < 0 {
        result = result.recip(&wctx)?;
    }
    Ok(result.round(ctx))
}

/// `base^exponent` for real exponents.
///
/// # Errors
/// - `NumericError::Domain` for a negative base with a non-integral exponent
/// - `NumericError::DivisionByZero` for a zero base with a negative exponent
/// - `NumericError::Overflow` when the result magnitude is out of range
pub fn pow(base: &Decimal, exponent: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    if let Some(n) = exponent.to_i64() {
        return powi(base, n, ctx);
    }
    if base.is_zero() {
        return if exponent.is_positive() {
            Ok(Decimal::zero())
        } else {
            Err(NumericError::DivisionByZero)
        };
    }
    if base.is_negative() {
        // integral exponents beyond i64 keep their sign by parity
        return match exponent.to_bigint() {
            Some(n) => {
                let value = exp_of_product(&base.abs(), exponent, ctx)?;
                Ok(if n.bit(0) { -value } else { value })
            }
            None => Err(NumericError::Domain {
                function: "pow",
                argument: base.to_string(),
            }),
        };
    }
    exp_of_product(base, exponent, ctx)
}

/// `exp(exponent·ln(base))` for positive `base`.
fn exp_of_product(
    base: &Decimal,
    exponent: &Decimal,
    ctx: &MathContext,
) -> Result<Decimal, NumericError> {
    // The relative error of the result is the absolute error of the product
    let ln_digits = digits_of(base.adjusted_exponent().unsigned_abs()) + 1;
    let extra = (exponent.adjusted_exponent() + 1).max(0) as u64 + ln_digits;
    let wp = ctx.precision() + GUARD_DIGITS + extra;
    let product = (exponent * &ln_working(base, wp)?).round(&MathContext::working(wp));
    exp(&product, ctx)
}

/// The constant π.
///
/// # Examples
/// ```
/// use numeric_core::math::elementary::pi;
/// use numeric_core::types::MathContext;
///
/// assert_eq!(pi(&MathContext::DECIMAL32).to_string(), "3.141593");
/// ```
pub fn pi(ctx: &MathContext) -> Decimal {
    let wp = ctx.precision() + GUARD_DIGITS;
    let scale = pow10(wp);
    // π = 16·atan(1/5) - 4·atan(1/239)
    let value = BigInt::from(16) * arctan_inverse(5, &scale)
        - BigInt::from(4) * arctan_inverse(239, &scale);
    Decimal::new(value, -(wp as i64)).round(ctx)
}

/// `atan(1/n)` in fixed point with unit `scale`.
fn arctan_inverse(n: u32, scale: &BigInt) -> BigInt {
    let n = BigInt::from(n);
    let n_squared = &n * &n;
    let mut power = scale / &n;
    let mut sum = power.clone();
    let mut k = 1u64;
    loop {
        power = power / &n_squared;
        if power.is_zero() {
            break;
        }
        let term = &power / BigInt::from(2 * k + 1);
        if k % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }
        k += 1;
    }
    sum
}
