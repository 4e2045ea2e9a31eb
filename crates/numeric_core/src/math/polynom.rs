//! Polynomials with exact rational coefficients.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use crate::math::rational_function::RationalFunction;
use crate::traits::MathFunction;
use crate::types::{Decimal, ExactRational, MathContext, NumericError};

/// Polynomial `c₀xⁿ + c₁xⁿ⁻¹ + … + cₙ`.
///
/// Coefficients are stored highest degree first. Evaluation is exact; a
/// decimal result is rounded once, after the exact value is known.
///
/// # Examples
/// ```
/// use numeric_core::math::Polynom;
/// use numeric_core::types::ExactRational;
///
/// let p = Polynom::from_integers(&[3, 2, 17]).unwrap();
/// assert_eq!(p.grade(), 2);
/// assert_eq!(p.calculate(&ExactRational::from_integer(7)).to_string(), "178");
///
/// let half_eleven = ExactRational::new(11, 2).unwrap();
/// assert_eq!(p.calculate(&half_eleven).to_string(), "475/4");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynom {
    coefficients: Vec<ExactRational>,
}

impl Polynom {
    /// Build from coefficients, highest degree first.
    ///
    /// # Errors
    /// `NumericError::InvalidArgument` if `coefficients` is empty.
    pub fn new(coefficients: Vec<ExactRational>) -> Result<Self, NumericError> {
        if coefficients.is_empty() {
            return Err(NumericError::InvalidArgument(
                "a polynomial needs at least one coefficient".to_string(),
            ));
        }
        Ok(Self {
            coefficients: coefficients.iter().map(ExactRational::reduce).collect(),
        })
    }

    /// Build from integer coefficients, highest degree first.
    pub fn from_integers(coefficients: &[i64]) -> Result<Self, NumericError> {
        Self::new(
            coefficients
                .iter()
                .map(|&c| ExactRational::from_integer(c))
                .collect(),
        )
    }

    pub fn coefficients(&self) -> &[ExactRational] {
        &self.coefficients
    }

    /// Degree as declared by the coefficient count.
    pub fn grade(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Exact value at `x` by Horner's method.
    ///
    /// Intermediate fractions are left unreduced; the result is reduced once.
    pub fn calculate(&self, x: &ExactRational) -> ExactRational {
        let (x_numerator, x_denominator) = (x.numerator(), x.denominator());
        let mut numerator = self.coefficients[0].numerator().clone();
        let mut denominator = self.coefficients[0].denominator().clone();
        for c in &self.coefficients[1..] {
            // n/d · xn/xd + cn/cd
            let scaled_denominator = &denominator * x_denominator;
            numerator = &numerator * x_numerator * c.denominator() + c.numerator() * &scaled_denominator;
            denominator = scaled_denominator * c.denominator();
        }
        // product of positive denominators
        ExactRational::from(BigRational::new(numerator, denominator))
    }

    pub fn add(&self, other: &Polynom) -> Polynom {
        self.combine(other, false)
    }

    pub fn subtract(&self, other: &Polynom) -> Polynom {
        self.combine(other, true)
    }

    /// Quotient as a rational function.
    pub fn divide(&self, other: &Polynom) -> RationalFunction<Polynom, Polynom> {
        RationalFunction::new(self.clone(), other.clone())
    }

    /// # Errors
    /// Always `NumericError::NotImplemented`.
    pub fn multiply(&self, _other: &Polynom) -> Result<Polynom, NumericError> {
        Err(NumericError::NotImplemented("polynomial multiplication"))
    }

    /// Formal derivative.
    pub fn derivative(&self) -> Polynom {
        let grade = self.grade();
        if grade == 0 {
            return Polynom {
                coefficients: vec![ExactRational::zero()],
            };
        }
        let coefficients = self.coefficients[..grade]
            .iter()
            .enumerate()
            .map(|(i, c)| c.multiply(&ExactRational::from_integer(BigInt::from(grade - i))))
            .collect();
        Polynom { coefficients }
    }

    /// Coefficient-wise sum or difference, aligned at the constant term.
    fn combine(&self, other: &Polynom, subtract: bool) -> Polynom {
        let length = self.coefficients.len().max(other.coefficients.len());
        let padded = |p: &Polynom| {
            let padding = length - p.coefficients.len();
            std::iter::repeat(ExactRational::zero())
                .take(padding)
                .chain(p.coefficients.iter().cloned())
                .collect::<Vec<_>>()
        };
        let coefficients = padded(self)
            .iter()
            .zip(padded(other).iter())
            .map(|(a, b)| if subtract { a.subtract(b) } else { a.add(b) })
            .collect();
        Polynom { coefficients }
    }
}

impl MathFunction<ExactRational> for Polynom {
    type Error = NumericError;

    fn calculate_with(
        &self,
        _ctx: &MathContext,
        x: &ExactRational,
    ) -> Result<ExactRational, NumericError> {
        Ok(Polynom::calculate(self, x))
    }
}

impl MathFunction<Decimal> for Polynom {
    type Error = NumericError;

    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, NumericError> {
        Ok(Polynom::calculate(self, &ExactRational::from(x)).decimal_value(ctx))
    }
}

impl fmt::Display for Polynom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grade = self.grade();
        let mut first = true;
        for (i, c) in self.coefficients.iter().enumerate() {
            let power = grade - i;
            if c.is_zero() && !(first && power == 0) {
                continue;
            }
            let magnitude = if c.signum() < 0 { c.negate() } else { c.clone() };
            if first {
                if c.signum() < 0 {
                    f.write_str("-")?;
                }
            } else if c.signum() < 0 {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            first = false;
            let unit = magnitude.numerator().is_one() && magnitude.denominator().is_one();
            match power {
                0 => write!(f, "{}", magnitude)?,
                1 if unit => f.write_str("x")?,
                1 => write!(f, "{}x", magnitude)?,
                _ if unit => write!(f, "x^{}", power)?,
                _ => write!(f, "{}x^{}", magnitude, power)?,
            }
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}
