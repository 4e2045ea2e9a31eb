//! The gamma function and its logarithm.
//!
//! `ln Γ` shifts its argument up with the recurrence `Γ(x + 1) = xΓ(x)`
//! until Stirling's series converges to the working precision, then
//! subtracts the logarithm of the shift product.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use tracing::trace;

use crate::math::elementary::{self, GUARD_DIGITS};
use crate::types::{Decimal, ExactRational, MathContext, NumericError};

/// Positive integers up to this bound get an exact factorial.
const EXACT_FACTORIAL_LIMIT: i64 = 1_000;

const MAX_STIRLING_TERMS: usize = 10_000;

/// Retries of `ln_gamma` with more digits after cancellation.
const MAX_PRECISION_RETRIES: usize = 8;

/// Natural logarithm of the gamma function for positive arguments.
///
/// # Errors
/// `NumericError::Domain` for `x <= 0`.
///
/// # Examples
/// ```
/// use numeric_core::math::gamma::ln_gamma;
/// use numeric_core::types::{Decimal, MathContext};
///
/// // ln Γ(10) = ln 9!
/// let value = ln_gamma(&Decimal::from(10), &MathContext::DECIMAL32).unwrap();
/// assert_eq!(value.to_string(), "12.80183");
/// ```
pub fn ln_gamma(x: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    if !x.is_positive() {
        return Err(NumericError::Domain {
            function: "ln_gamma",
            argument: x.to_string(),
        });
    }
    if *x == Decimal::one() || *x == Decimal::from(2) {
        return Ok(Decimal::zero());
    }

    let target = ctx.precision() + GUARD_DIGITS;
    let mut wp = target;
    for _ in 0..MAX_PRECISION_RETRIES {
        let (value, scale) = ln_gamma_working(x, wp)?;
        // leading digits cancelled between Stirling and the shift product
        let lost = if value.is_zero() {
            wp
        } else {
            (scale - value.adjusted_exponent()).max(0) as u64
        };
        if wp >= target + lost {
            return Ok(value.round(ctx));
        }
        trace!(lost, precision = wp, "ln_gamma retrying with more digits");
        wp = target + lost + 2;
    }
    Err(NumericError::NonConvergence {
        function: "ln_gamma",
        iterations: MAX_PRECISION_RETRIES,
    })
}

/// `(ln Γ(x), adjusted exponent of the largest intermediate)` at `wp` digits.
fn ln_gamma_working(x: &Decimal, wp: u64) -> Result<(Decimal, i64), NumericError> {
    let wctx = MathContext::working(wp);
    let threshold = Decimal::from(wp);

    // ln Γ(x) = ln Γ(x + n) - ln(x (x + 1) ... (x + n - 1))
    let mut z = x.clone();
    let mut product = Decimal::one();
    let mut shifted = false;
    while z < threshold {
        product = (&product * &z).round(&wctx);
        z = &z + &Decimal::one();
        shifted = true;
    }

    let head = stirling(&z, wp)?;
    if !shifted {
        let scale = head.adjusted_exponent();
        return Ok((head, scale));
    }
    let correction = elementary::ln_working(&product, wp)?;
    let scale = head.adjusted_exponent().max(correction.adjusted_exponent());
    Ok(((&head - &correction).round(&wctx), scale))
}

/// Stirling's series
/// `(z - ½) ln z - z + ½ ln 2π + Σ B₂ₖ / (2k (2k - 1) z^(2k-1))`.
fn stirling(z: &Decimal, wp: u64) -> Result<Decimal, NumericError> {
    let wctx = MathContext::working(wp);
    let half = Decimal::half();
    let ln_z = elementary::ln_working(z, wp)?;
    let two_pi = &elementary::pi(&wctx) * &Decimal::from(2);
    let half_ln_two_pi = &elementary::ln_working(&two_pi, wp)? * &half;

    let mut sum = (&(&(z - &half) * &ln_z) - z + half_ln_two_pi).round(&wctx);

    let z_inverse = z.recip(&wctx)?;
    let z_inverse_squared = (&z_inverse * &z_inverse).round(&wctx);
    let mut power = z_inverse;
    let mut bernoulli = BernoulliNumbers::new();
    let mut previous: Option<Decimal> = None;

    for k in 1..=MAX_STIRLING_TERMS {
        let two_k = 2 * k as u64;
        let coefficient = bernoulli
            .even(k)
            .decimal_value(&wctx)
            .div(&Decimal::from(two_k * (two_k - 1)), &wctx)?;
        let term = (&coefficient * &power).round(&wctx);
        if term.is_zero() || term.adjusted_exponent() < sum.adjusted_exponent() - wp as i64 - 1 {
            trace!(terms = k, precision = wp, "Stirling series converged");
            return Ok(sum);
        }
        // the series is asymptotic; growing terms mean z is too small
        if previous.as_ref().is_some_and(|p| term.abs() >= p.abs()) {
            break;
        }
        sum = (&sum + &term).round(&wctx);
        power = (&power * &z_inverse_squared).round(&wctx);
        previous = Some(term);
    }
    Err(NumericError::NonConvergence {
        function: "ln_gamma",
        iterations: MAX_STIRLING_TERMS,
    })
}

/// The gamma function.
///
/// Positive integers up to 1000 are computed exactly as `(n - 1)!`.
///
/// # Errors
/// - `NumericError::Pole` at zero and the negative integers
/// - `NumericError::Domain` for other negative arguments
/// - `NumericError::Overflow` when `ln Γ(x)` reaches `10^16`
pub fn gamma(x: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
    if x.is_integer() {
        if !x.is_positive() {
            return Err(NumericError::Pole {
                function: "gamma",
                at: x.to_string(),
            });
        }
        if let Some(n) = x.to_i64().filter(|n| *n <= EXACT_FACTORIAL_LIMIT) {
            let factorial = (1..n).fold(BigInt::one(), |acc, k| acc * k);
            return Ok(Decimal::from(factorial).round(ctx));
        }
    } else if x.is_negative() {
        return Err(NumericError::Domain {
            function: "gamma",
            argument: x.to_string(),
        });
    }

    // relative accuracy of Γ is the absolute accuracy of ln Γ
    let target = ctx.precision() + GUARD_DIGITS;
    let estimate = ln_gamma(x, &MathContext::working(target))?;
    let magnitude = (estimate.adjusted_exponent() + 1).max(0) as u64;
    let log_value = if magnitude == 0 {
        estimate
    } else {
        ln_gamma(x, &MathContext::working(target + magnitude))?
    };
    elementary::exp(&log_value, ctx)
}

/// Bernoulli numbers from the exact recurrence
/// `B_m = -1/(m + 1) Σ_{j<m} C(m + 1, j) B_j`.
struct BernoulliNumbers {
    values: Vec<BigRational>,
}

impl BernoulliNumbers {
    fn new() -> Self {
        Self {
            values: vec![BigRational::one()],
        }
    }

    /// `B_{2k}`.
    fn even(&mut self, k: usize) -> ExactRational {
        let index = 2 * k;
        while self.values.len() <= index {
            let m = self.values.len();
            let value = if m > 1 && m % 2 == 1 {
                BigRational::zero()
            } else {
                self.next(m)
            };
            self.values.push(value);
        }
        ExactRational::from(self.values[index].clone())
    }

    fn next(&self, m: usize) -> BigRational {
        let mut sum = BigRational::zero();
        let mut binomial = BigInt::one();
        for (j, b) in self.values.iter().enumerate() {
            if !b.is_zero() {
                sum += b * BigRational::from_integer(binomial.clone());
            }
            binomial = binomial * BigInt::from(m + 1 - j) / BigInt::from(j + 1);
        }
        -sum / BigRational::from_integer(BigInt::from(m + 1))
    }
}
