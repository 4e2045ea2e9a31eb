//! Quotients of exactly evaluated functions.

use std::fmt;

use crate::math::polynom::Polynom;
use crate::traits::MathFunction;
use crate::types::{Decimal, ExactRational, MathContext, NumericError};

/// `numerator(x) / denominator(x)` evaluated in exact rational arithmetic.
///
/// Evaluation at a zero of the denominator reports `NumericError::Pole`.
///
/// # Examples
/// ```
/// use numeric_core::math::{Polynom, RationalFunction};
/// use numeric_core::types::ExactRational;
///
/// let f = RationalFunction::new(
///     Polynom::from_integers(&[1, 0]).unwrap(),
///     Polynom::from_integers(&[1, -2]).unwrap(),
/// );
/// let value = f.calculate(&ExactRational::from_integer(4)).unwrap();
/// assert_eq!(value, ExactRational::from_integer(2));
/// assert!(f.calculate(&ExactRational::from_integer(2)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RationalFunction<N = Polynom, D = Polynom> {
    numerator: N,
    denominator: D,
}

impl<N, D> RationalFunction<N, D> {
    pub fn new(numerator: N, denominator: D) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> &N {
        &self.numerator
    }

    pub fn denominator(&self) -> &D {
        &self.denominator
    }
}

impl<N, D> RationalFunction<N, D>
where
    N: MathFunction<ExactRational, Error = NumericError>,
    D: MathFunction<ExactRational, Error = NumericError>,
{
    /// Exact value at `x`.
    ///
    /// # Errors
    /// `NumericError::Pole` where the denominator vanishes, or any error of
    /// the component functions.
    pub fn calculate(&self, x: &ExactRational) -> Result<ExactRational, NumericError> {
        self.evaluate(&MathContext::DEFAULT, x)
    }

    fn evaluate(&self, ctx: &MathContext, x: &ExactRational) -> Result<ExactRational, NumericError> {
        let numerator = self.numerator.calculate_with(ctx, x)?;
        let denominator = self.denominator.calculate_with(ctx, x)?;
        if denominator.is_zero() {
            return Err(NumericError::Pole {
                function: "rational function",
                at: x.to_string(),
            });
        }
        numerator.divide(&denominator)
    }
}

impl<N, D> MathFunction<ExactRational> for RationalFunction<N, D>
where
    N: MathFunction<ExactRational, Error = NumericError>,
    D: MathFunction<ExactRational, Error = NumericError>,
{
    type Error = NumericError;

    fn calculate_with(
        &self,
        ctx: &MathContext,
        x: &ExactRational,
    ) -> Result<ExactRational, NumericError> {
        self.evaluate(ctx, x)
    }
}

impl<N, D> MathFunction<Decimal> for RationalFunction<N, D>
where
    N: MathFunction<ExactRational, Error = NumericError>,
    D: MathFunction<ExactRational, Error = NumericError>,
{
    type Error = NumericError;

    /// Exact evaluation at the decimal point, rounded once under `ctx`.
    fn calculate_with(&self, ctx: &MathContext, x: &Decimal) -> Result<Decimal, NumericError> {
        Ok(self.evaluate(ctx, &ExactRational::from(x))?.decimal_value(ctx))
    }
}

impl<N: fmt::Display, D: fmt::Display> fmt::Display for RationalFunction<N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) / ({})", self.numerator, self.denominator)
    }
}
