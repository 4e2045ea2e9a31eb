//! Arbitrary-precision decimal numbers.
//!
//! A [`Decimal`] is `mantissa × 10^exponent` with an unbounded integer
//! mantissa. Addition, subtraction, multiplication and negation are exact;
//! division and every transcendental operation take a [`MathContext`] and
//! round exactly once.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::types::context::MathContext;
use crate::types::error::NumericError;

/// `10^n` as a signed big integer.
pub(crate) fn pow10(n: u64) -> BigInt {
    BigInt::from(pow10_unsigned(n))
}

fn pow10_unsigned(n: u64) -> BigUint {
    let exponent = u32::try_from(n).unwrap_or(u32::MAX);
    BigUint::from(10u32).pow(exponent)
}

/// Number of decimal digits of `|n|` (one for zero).
pub(crate) fn digit_count(n: &BigInt) -> u64 {
    let bits = n.bits();
    if bits == 0 {
        return 1;
    }
    // 2^(bits-1) <= |n| < 2^bits bounds the answer to two candidates
    let estimate = ((bits - 1) as f64 * std::f64::consts::LOG10_2) as u64 + 1;
    if n.magnitude() >= &pow10_unsigned(estimate) {
        estimate + 1
    } else {
        estimate
    }
}

/// Arbitrary-precision decimal value.
///
/// Equality and ordering compare numeric values, so `1.0 == 1.00`.
///
/// # Examples
/// ```
/// use numeric_core::types::{Decimal, MathContext, RoundingMode};
///
/// let a: Decimal = "1.25".parse().unwrap();
/// let b: Decimal = "0.75".parse().unwrap();
/// assert_eq!(&a + &b, Decimal::from(2));
///
/// let ctx = MathContext::new(5, RoundingMode::HalfUp).unwrap();
/// let third = Decimal::one().div(&Decimal::from(3), &ctx).unwrap();
/// assert_eq!(third.to_string(), "0.33333");
/// ```
#[derive(Clone, Debug)]
pub struct Decimal {
    mantissa: BigInt,
    exponent: i64,
}

impl Decimal {
    /// Build `mantissa × 10^exponent`.
    pub fn new(mantissa: impl Into<BigInt>, exponent: i64) -> Self {
        Self {
            mantissa: mantissa.into(),
            exponent,
        }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    #[inline]
    pub fn one() -> Self {
        Self::new(1, 0)
    }

    /// Exactly one half.
    #[inline]
    pub fn half() -> Self {
        Self::new(5, -1)
    }

    #[inline]
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    #[inline]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.mantissa.is_positive()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        match self.mantissa.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    pub fn abs(&self) -> Self {
        Self::new(self.mantissa.abs(), self.exponent)
    }

    /// Number of digits in the mantissa.
    pub fn digit_count(&self) -> u64 {
        digit_count(&self.mantissa)
    }

    /// Exponent of the leading digit: `floor(log10(|self|))` for non-zero values.
    pub fn adjusted_exponent(&self) -> i64 {
        self.exponent + self.digit_count() as i64 - 1
    }

    /// Multiply by `10^n` exactly.
    pub fn scale_by_power_of_ten(&self, n: i64) -> Self {
        Self::new(self.mantissa.clone(), self.exponent + n)
    }

    /// Remove trailing zeros from the mantissa without changing the value.
    pub fn normalized(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let ten = BigInt::from(10);
        let mut mantissa = self.mantissa.clone();
        let mut exponent = self.exponent;
        loop {
            let (quotient, remainder) = mantissa.div_rem(&ten);
            if !remainder.is_zero() {
                break;
            }
            mantissa = quotient;
            exponent += 1;
        }
        Self { mantissa, exponent }
    }

    /// Whether the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        if self.exponent >= 0 || self.is_zero() {
            return true;
        }
        let scale = self.exponent.unsigned_abs();
        if scale >= self.digit_count() {
            return false;
        }
        (&self.mantissa % pow10(scale)).is_zero()
    }

    /// The integral value, if the number is an integer.
    pub fn to_bigint(&self) -> Option<BigInt> {
        if !self.is_integer() {
            return None;
        }
        if self.exponent >= 0 {
            Some(&self.mantissa * pow10(self.exponent as u64))
        } else {
            Some(&self.mantissa / pow10(self.exponent.unsigned_abs()))
        }
    }

    /// The integral value as `i64`, if it is an integer in range.
    pub fn to_i64(&self) -> Option<i64> {
        if self.exponent > 18 && !self.is_zero() {
            return None;
        }
        self.to_bigint().and_then(|n| n.to_i64())
    }

    /// Nearest `f64` (infinite or zero when out of range).
    pub fn to_f64(&self) -> f64 {
        format!("{}e{}", self.mantissa, self.exponent)
            .parse()
            .unwrap_or(f64::NAN)
    }

    /// Round to `ctx.precision()` significant digits.
    pub fn round(&self, ctx: &MathContext) -> Self {
        let digits = self.digit_count();
        let precision = ctx.precision();
        if digits <= precision {
            return self.clone();
        }
        let dropped = digits - precision;
        let divisor = pow10(dropped);
        let negative = self.mantissa.is_negative();
        let (quotient, remainder) = self.mantissa.magnitude().div_rem(divisor.magnitude());
        let quotient = BigInt::from(quotient);
        let increment = ctx.rounding().increments(
            negative,
            &quotient,
            &BigInt::from(remainder),
            &divisor,
        );
        let mut magnitude = if increment { quotient + 1 } else { quotient };
        let mut exponent = self.exponent + dropped as i64;
        if digit_count(&magnitude) > precision {
            // 99..9 rounded up to 100..0
            magnitude /= 10;
            exponent += 1;
        }
        let mantissa = if negative { -magnitude } else { magnitude };
        Self { mantissa, exponent }
    }

    /// Quotient rounded under `ctx`.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` if `divisor` is zero.
    pub fn div(&self, divisor: &Decimal, ctx: &MathContext) -> Result<Decimal, NumericError> {
        if divisor.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(self.div_by_nonzero(divisor, ctx))
    }

    /// [`Decimal::div`] for a divisor already known to be non-zero.
    pub(crate) fn div_by_nonzero(&self, divisor: &Decimal, ctx: &MathContext) -> Decimal {
        if self.is_zero() {
            return Decimal::zero();
        }
        // Enough digits that the quotient carries at least one digit past the
        // rounding position; a non-zero remainder becomes a sticky digit.
        let wanted = ctx.precision() + 2 + divisor.digit_count();
        let shift = wanted.saturating_sub(self.digit_count());
        let numerator = &self.mantissa * pow10(shift);
        let (mut quotient, remainder) = numerator.div_rem(&divisor.mantissa);
        let mut exponent = self.exponent - shift as i64 - divisor.exponent;
        if !remainder.is_zero() {
            let sticky = if self.is_negative() != divisor.is_negative() {
                -1
            } else {
                1
            };
            quotient = quotient * 10 + sticky;
            exponent -= 1;
        }
        Decimal::new(quotient, exponent).round(ctx)
    }

    /// Reciprocal rounded under `ctx`.
    pub fn recip(&self, ctx: &MathContext) -> Result<Decimal, NumericError> {
        Decimal::one().div(self, ctx)
    }

    /// Align both mantissas to the smaller exponent.
    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, i64) {
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => (self.mantissa.clone(), other.mantissa.clone(), self.exponent),
            Ordering::Less => {
                let shift = (other.exponent - self.exponent) as u64;
                (
                    self.mantissa.clone(),
                    &other.mantissa * pow10(shift),
                    self.exponent,
                )
            }
            Ordering::Greater => {
                let shift = (self.exponent - other.exponent) as u64;
                (
                    &self.mantissa * pow10(shift),
                    other.mantissa.clone(),
                    other.exponent,
                )
            }
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Self::new(value, 0)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                fn from(value: $t) -> Self {
                    Self::new(BigInt::from(value), 0)
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64, usize);

impl TryFrom<f64> for Decimal {
    type Error = NumericError;

    /// Shortest decimal representation that round-trips to `value`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(NumericError::InvalidArgument(format!(
                "{} has no decimal representation",
                value
            )));
        }
        format!("{:e}", value).parse()
    }
}

impl FromStr for Decimal {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse_error = || NumericError::Parse(s.to_string());
        let (body, exponent) = match trimmed.find(['e', 'E']) {
            Some(index) => {
                let exponent: i64 = trimmed[index + 1..].parse().map_err(|_| parse_error())?;
                (&trimmed[..index], exponent)
            }
            None => (trimmed, 0),
        };
        let (negative, unsigned) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body.strip_prefix('+').unwrap_or(body)),
        };
        let (integral, fraction) = match unsigned.split_once('.') {
            Some((integral, fraction)) => (integral, fraction),
            None => (unsigned, ""),
        };
        if integral.is_empty() && fraction.is_empty() {
            return Err(parse_error());
        }
        let all_digits = integral
            .chars()
            .chain(fraction.chars())
            .all(|c| c.is_ascii_digit());
        if !all_digits {
            return Err(parse_error());
        }
        let digits = format!("{}{}", integral, fraction);
        let magnitude = BigInt::from_str(&digits).map_err(|_| parse_error())?;
        let mantissa = if negative { -magnitude } else { magnitude };
        Ok(Decimal::new(mantissa, exponent - fraction.len() as i64))
    }
}

impl fmt::Display for Decimal {
    /// Plain notation for moderate exponents, `d.dddE±n` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_string();
        let sign = if self.is_negative() { "-" } else { "" };
        let adjusted = self.adjusted_exponent();
        let length = digits.len() as i64;

        if self.exponent <= 0 && adjusted >= -7 {
            let scale = (-self.exponent) as usize;
            if scale == 0 {
                return write!(f, "{}{}", sign, digits);
            }
            if digits.len() > scale {
                let split = digits.len() - scale;
                return write!(f, "{}{}.{}", sign, &digits[..split], &digits[split..]);
            }
            let zeros = "0".repeat(scale - digits.len());
            return write!(f, "{}0.{}{}", sign, zeros, digits);
        }
        if self.exponent > 0 && adjusted < 21 {
            let zeros = "0".repeat(self.exponent as usize);
            return write!(f, "{}{}{}", sign, digits, zeros);
        }
        let (head, tail) = digits.split_at(1);
        let exponent_sign = if adjusted >= 0 { "+" } else { "" };
        if length > 1 {
            write!(f, "{}{}.{}E{}{}", sign, head, tail, exponent_sign, adjusted)
        } else {
            write!(f, "{}{}E{}{}", sign, head, exponent_sign, adjusted)
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let signs = self.signum().cmp(&other.signum());
        if signs != Ordering::Equal {
            return signs;
        }
        if self.is_zero() {
            return Ordering::Equal;
        }
        // Same sign, both non-zero: the leading digit position decides first
        let magnitude = self.adjusted_exponent().cmp(&other.adjusted_exponent());
        let ordering = if magnitude != Ordering::Equal {
            magnitude
        } else {
            let (a, b, _) = self.aligned(other);
            a.magnitude().cmp(b.magnitude())
        };
        if self.is_negative() {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-self.mantissa, self.exponent)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-&self.mantissa, self.exponent)
    }
}

impl Add<&Decimal> for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let (a, b, exponent) = self.aligned(rhs);
        Decimal::new(a + b, exponent)
    }
}

impl Sub<&Decimal> for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let (a, b, exponent) = self.aligned(rhs);
        Decimal::new(a - b, exponent)
    }
}

impl Mul<&Decimal> for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::new(&self.mantissa * &rhs.mantissa, self.exponent + rhs.exponent)
    }
}

macro_rules! forward_owned_ops {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl $trait<Decimal> for Decimal {
                type Output = Decimal;

                fn $method(self, rhs: Decimal) -> Decimal {
                    (&self).$method(&rhs)
                }
            }

            impl $trait<&Decimal> for Decimal {
                type Output = Decimal;

                fn $method(self, rhs: &Decimal) -> Decimal {
                    (&self).$method(rhs)
                }
            }

            impl $trait<Decimal> for &Decimal {
                type Output = Decimal;

                fn $method(self, rhs: Decimal) -> Decimal {
                    self.$method(&rhs)
                }
            }
        )*
    };
}

forward_owned_ops!(Add::add, Sub::sub, Mul::mul);

impl One for Decimal {
    fn one() -> Self {
        Decimal::one()
    }
}

impl Zero for Decimal {
    fn zero() -> Self {
        Decimal::zero()
    }

    fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }
}
