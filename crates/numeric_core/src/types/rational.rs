//! Exact rational numbers.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::types::context::MathContext;
use crate::types::decimal::{pow10, Decimal};
use crate::types::error::NumericError;

/// Arbitrary-precision fraction kept in lowest terms.
///
/// The denominator is always positive and zero is stored as `0/1`.
/// Values are immutable; every operation returns a new instance.
///
/// # Examples
/// ```
/// use numeric_core::types::ExactRational;
///
/// let a = ExactRational::new(6, -8).unwrap();
/// assert_eq!(a.to_string(), "-3/4");
///
/// let b: ExactRational = "0.25".parse().unwrap();
/// assert_eq!(a.add(&b).to_string(), "-1/2");
///
/// assert!(a.divide(&ExactRational::zero()).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExactRational {
    value: BigRational,
}

impl ExactRational {
    /// Reduced fraction `numerator / denominator`.
    ///
    /// # Errors
    /// `NumericError::DivisionByZero` if `denominator` is zero.
    pub fn new(
        numerator: impl Into<BigInt>,
        denominator: impl Into<BigInt>,
    ) -> Result<Self, NumericError> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(Self {
            value: BigRational::new(numerator.into(), denominator),
        })
    }

    /// Fraction exactly as given, without gcd reduction.
    ///
    /// Used for intermediate results that are reduced once at the end with
    /// [`ExactRational::reduce`]. A negative denominator is moved to the
    /// numerator so the sign convention still holds.
    pub fn from_raw_parts(numerator: BigInt, denominator: BigInt) -> Result<Self, NumericError> {
        if denominator.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        let (numerator, denominator) = if denominator.is_negative() {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        Ok(Self {
            value: BigRational::new_raw(numerator, denominator),
        })
    }

    /// Integral value `n / 1`.
    pub fn from_integer(n: impl Into<BigInt>) -> Self {
        Self {
            value: BigRational::from_integer(n.into()),
        }
    }

    /// Exact binary value of a finite `f64`.
    ///
    /// # Errors
    /// `NumericError::InvalidArgument` for NaN or infinite input.
    pub fn from_f64(value: f64) -> Result<Self, NumericError> {
        BigRational::from_float(value)
            .map(|value| Self { value })
            .ok_or_else(|| {
                NumericError::InvalidArgument(format!("{} is not a finite number", value))
            })
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn numerator(&self) -> &BigInt {
        self.value.numer()
    }

    pub fn denominator(&self) -> &BigInt {
        self.value.denom()
    }

    /// Copy divided through by the gcd of numerator and denominator.
    pub fn reduce(&self) -> Self {
        Self {
            value: self.value.reduced(),
        }
    }

    pub fn add(&self, other: &ExactRational) -> Self {
        Self {
            value: &self.value + &other.value,
        }
    }

    pub fn subtract(&self, other: &ExactRational) -> Self {
        Self {
            value: &self.value - &other.value,
        }
    }

    pub fn multiply(&self, other: &ExactRational) -> Self {
        Self {
            value: &self.value * &other.value,
        }
    }

    /// # Errors
    /// `NumericError::DivisionByZero` if `other` is zero.
    pub fn divide(&self, other: &ExactRational) -> Result<Self, NumericError> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(Self {
            value: &self.value / &other.value,
        })
    }

    pub fn negate(&self) -> Self {
        Self {
            value: -&self.value,
        }
    }

    /// # Errors
    /// `NumericError::DivisionByZero` for zero.
    pub fn reciprocal(&self) -> Result<Self, NumericError> {
        if self.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(Self {
            value: self.value.recip(),
        })
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        if self.value.is_zero() {
            0
        } else if self.value.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.value.is_integer()
    }

    /// Decimal value rounded once under `ctx`.
    pub fn decimal_value(&self, ctx: &MathContext) -> Decimal {
        let numerator = Decimal::from(self.value.numer().clone());
        let denominator = Decimal::from(self.value.denom().clone());
        // denominator is positive
        numerator.div_by_nonzero(&denominator, ctx)
    }

    pub fn as_big_rational(&self) -> &BigRational {
        &self.value
    }
}

impl Default for ExactRational {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigRational> for ExactRational {
    fn from(value: BigRational) -> Self {
        Self {
            value: value.reduced(),
        }
    }
}

impl From<i64> for ExactRational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<&Decimal> for ExactRational {
    /// Exact conversion; no rounding takes place.
    fn from(value: &Decimal) -> Self {
        let mantissa = value.mantissa().clone();
        let exponent = value.exponent();
        if exponent >= 0 {
            Self::from_integer(mantissa * pow10(exponent as u64))
        } else {
            Self {
                value: BigRational::new(mantissa, pow10(exponent.unsigned_abs())),
            }
        }
    }
}

impl FromStr for ExactRational {
    type Err = NumericError;

    /// Accepts `n/d` fractions and decimal literals such as `-1.25e-3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((numerator, denominator)) => {
                let parse = |part: &str| {
                    BigInt::from_str(part.trim()).map_err(|_| NumericError::Parse(s.to_string()))
                };
                Self::new(parse(numerator)?, parse(denominator)?)
            }
            None => {
                let decimal: Decimal = trimmed.parse()?;
                Ok(Self::from(&decimal))
            }
        }
    }
}

impl fmt::Display for ExactRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.denom().is_one() {
            write!(f, "{}", self.value.numer())
        } else {
            write!(f, "{}/{}", self.value.numer(), self.value.denom())
        }
    }
}

impl PartialOrd for ExactRational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactRational {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Add for &ExactRational {
    type Output = ExactRational;

    fn add(self, rhs: &ExactRational) -> ExactRational {
        ExactRational::add(self, rhs)
    }
}

impl Sub for &ExactRational {
    type Output = ExactRational;

    fn sub(self, rhs: &ExactRational) -> ExactRational {
        self.subtract(rhs)
    }
}

impl Mul for &ExactRational {
    type Output = ExactRational;

    fn mul(self, rhs: &ExactRational) -> ExactRational {
        self.multiply(rhs)
    }
}

impl Neg for &ExactRational {
    type Output = ExactRational;

    fn neg(self) -> ExactRational {
        self.negate()
    }
}
