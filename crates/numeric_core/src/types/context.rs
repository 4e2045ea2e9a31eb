//! Precision and rounding descriptors.
//!
//! A [`MathContext`] travels explicitly with every precision-sensitive call.
//! The only default is the documented [`MathContext::DEFAULT`] constant, used
//! when a caller evaluates through a convenience method without a context.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::types::decimal::Decimal;
use crate::types::error::NumericError;

/// Rounding rule applied when discarding digits.
///
/// # Variants
/// - `Up`: Away from zero
/// - `Down`: Towards zero (truncation)
/// - `Ceiling`: Towards positive infinity
/// - `Floor`: Towards negative infinity
/// - `HalfUp`: Nearest neighbour, ties away from zero
/// - `HalfDown`: Nearest neighbour, ties towards zero
/// - `HalfEven`: Nearest neighbour, ties to the even neighbour (banker's rounding)
///
/// # Examples
/// ```
/// use numeric_core::types::RoundingMode;
///
/// let mode: RoundingMode = "HALF_UP".parse().unwrap();
/// assert_eq!(mode, RoundingMode::HalfUp);
/// assert_eq!(mode.to_string(), "HALF_UP");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    Up,
    Down,
    Ceiling,
    Floor,
    HalfUp,
    HalfDown,
    #[default]
    HalfEven,
}

impl RoundingMode {
    /// Decide whether a truncated quotient must move one unit away from zero.
    ///
    /// `remainder` and `divisor` are magnitudes of the discarded part and of
    /// one unit at the rounding position.
    pub(crate) fn increments(
        self,
        negative: bool,
        quotient: &BigInt,
        remainder: &BigInt,
        divisor: &BigInt,
    ) -> bool {
        if remainder.is_zero() {
            return false;
        }
        let twice: BigInt = remainder << 1u32;
        match self {
            RoundingMode::Up => true,
            RoundingMode::Down => false,
            RoundingMode::Ceiling => !negative,
            RoundingMode::Floor => negative,
            RoundingMode::HalfUp => &twice >= divisor,
            RoundingMode::HalfDown => &twice > divisor,
            RoundingMode::HalfEven => {
                &twice > divisor || (&twice == divisor && quotient.bit(0))
            }
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundingMode::Up => "UP",
            RoundingMode::Down => "DOWN",
            RoundingMode::Ceiling => "CEILING",
            RoundingMode::Floor => "FLOOR",
            RoundingMode::HalfUp => "HALF_UP",
            RoundingMode::HalfDown => "HALF_DOWN",
            RoundingMode::HalfEven => "HALF_EVEN",
        };
        f.write_str(name)
    }
}

impl FromStr for RoundingMode {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "UP" => Ok(RoundingMode::Up),
            "DOWN" => Ok(RoundingMode::Down),
            "CEILING" => Ok(RoundingMode::Ceiling),
            "FLOOR" => Ok(RoundingMode::Floor),
            "HALF_UP" | "HALFUP" => Ok(RoundingMode::HalfUp),
            "HALF_DOWN" | "HALFDOWN" => Ok(RoundingMode::HalfDown),
            "HALF_EVEN" | "HALFEVEN" => Ok(RoundingMode::HalfEven),
            _ => Err(NumericError::InvalidArgument(format!(
                "unknown rounding mode '{}'",
                s
            ))),
        }
    }
}

/// Precision (significant decimal digits) and rounding mode.
///
/// # Examples
/// ```
/// use numeric_core::types::{MathContext, RoundingMode};
///
/// let ctx = MathContext::new(50, RoundingMode::HalfUp).unwrap();
/// assert_eq!(ctx.precision(), 50);
///
/// // Working contexts carry guard digits and round half-even
/// let working = ctx.widened(10);
/// assert_eq!(working.precision(), 60);
/// assert_eq!(working.rounding(), RoundingMode::HalfEven);
///
/// assert!(MathContext::new(0, RoundingMode::HalfUp).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MathContext {
    precision: u64,
    rounding: RoundingMode,
}

impl MathContext {
    /// 7 digits, half-even (IEEE 754 decimal32).
    pub const DECIMAL32: MathContext = MathContext {
        precision: 7,
        rounding: RoundingMode::HalfEven,
    };

    /// 16 digits, half-even (IEEE 754 decimal64).
    pub const DECIMAL64: MathContext = MathContext {
        precision: 16,
        rounding: RoundingMode::HalfEven,
    };

    /// 34 digits, half-even (IEEE 754 decimal128).
    pub const DECIMAL128: MathContext = MathContext {
        precision: 34,
        rounding: RoundingMode::HalfEven,
    };

    /// Context used when a caller omits one.
    pub const DEFAULT: MathContext = MathContext::DECIMAL128;

    /// Create a context.
    ///
    /// # Errors
    /// `NumericError::InvalidArgument` if `precision` is zero.
    pub fn new(precision: u64, rounding: RoundingMode) -> Result<Self, NumericError> {
        if precision == 0 {
            return Err(NumericError::InvalidArgument(
                "precision must be at least one digit".to_string(),
            ));
        }
        Ok(Self {
            precision,
            rounding,
        })
    }

    /// Half-even working context with the given number of digits.
    pub fn working(precision: u64) -> Self {
        Self {
            precision: precision.max(1),
            rounding: RoundingMode::HalfEven,
        }
    }

    /// Number of significant digits.
    #[inline]
    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Rounding mode.
    #[inline]
    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Same rounding mode with a different precision (at least one digit).
    pub fn with_precision(&self, precision: u64) -> Self {
        Self {
            precision: precision.max(1),
            rounding: self.rounding,
        }
    }

    /// Working context with `extra` guard digits.
    pub fn widened(&self, extra: u64) -> Self {
        Self::working(self.precision + extra)
    }

    /// Relative epsilon `10^(1 - precision)`.
    pub fn epsilon(&self) -> Decimal {
        Decimal::new(1, 1 - self.precision as i64)
    }

    /// One unit in the last place of `value` under this precision.
    ///
    /// For zero this is `10^(-precision)`.
    pub fn ulp(&self, value: &Decimal) -> Decimal {
        if value.is_zero() {
            return Decimal::new(1, -(self.precision as i64));
        }
        Decimal::new(1, value.adjusted_exponent() - self.precision as i64 + 1)
    }
}

impl Default for MathContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MathContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precision={} rounding={}", self.precision, self.rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_mode_round_trip() {
        for mode in [
            RoundingMode::Up,
            RoundingMode::Down,
            RoundingMode::Ceiling,
            RoundingMode::Floor,
            RoundingMode::HalfUp,
            RoundingMode::HalfDown,
            RoundingMode::HalfEven,
        ] {
            let parsed: RoundingMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_rounding_mode_lenient_parsing() {
        assert_eq!("half-even".parse::<RoundingMode>().unwrap(), RoundingMode::HalfEven);
        assert_eq!(" floor ".parse::<RoundingMode>().unwrap(), RoundingMode::Floor);
        assert!("NEAREST".parse::<RoundingMode>().is_err());
    }

    #[test]
    fn test_default_context() {
        let ctx = MathContext::default();
        assert_eq!(ctx.precision(), 34);
        assert_eq!(ctx.rounding(), RoundingMode::HalfEven);
    }

    #[test]
    fn test_zero_precision_rejected() {
        let result = MathContext::new(0, RoundingMode::HalfUp);
        assert!(matches!(result, Err(NumericError::InvalidArgument(_))));
    }

    #[test]
    fn test_epsilon_and_ulp() {
        let ctx = MathContext::new(5, RoundingMode::HalfUp).unwrap();
        assert_eq!(ctx.epsilon(), "0.0001".parse::<Decimal>().unwrap());
        let value: Decimal = "123.45".parse().unwrap();
        assert_eq!(ctx.ulp(&value), "0.01".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_with_precision_keeps_rounding() {
        let ctx = MathContext::new(20, RoundingMode::Floor).unwrap();
        let narrow = ctx.with_precision(5);
        assert_eq!(narrow.precision(), 5);
        assert_eq!(narrow.rounding(), RoundingMode::Floor);
        assert_eq!(ctx.with_precision(0).precision(), 1);
    }
}
