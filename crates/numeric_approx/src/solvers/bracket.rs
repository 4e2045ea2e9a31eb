//! Search intervals for bracketing strategies.

use numeric_core::traits::{BoundedMathFunction, Monotonicity};
use numeric_core::types::{Decimal, MathContext};
use tracing::debug;

use crate::error::ApproximationError;
use crate::solvers::working_context;

/// Closed interval `[lower, upper]` with `lower < upper`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    lower: Decimal,
    upper: Decimal,
}

impl Bracket {
    /// # Errors
    /// `ApproximationError::InvalidBracket` unless `lower < upper`.
    pub fn new(lower: Decimal, upper: Decimal) -> Result<Self, ApproximationError> {
        if lower >= upper {
            return Err(ApproximationError::InvalidBracket { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Bracket spanning the function's finite domain.
    ///
    /// # Errors
    /// `ApproximationError::UnboundedDomain` if either bound is missing.
    pub fn from_bounds<E>(
        function: &dyn BoundedMathFunction<Decimal, Error = E>,
    ) -> Result<Self, ApproximationError> {
        match (function.lower_bound(), function.upper_bound()) {
            (Some(lower), Some(upper)) => Self::new(lower, upper),
            _ => Err(ApproximationError::UnboundedDomain),
        }
    }

    pub fn lower(&self) -> &Decimal {
        &self.lower
    }

    pub fn upper(&self) -> &Decimal {
        &self.upper
    }

    pub fn width(&self) -> Decimal {
        &self.upper - &self.lower
    }

    pub fn midpoint(&self) -> Decimal {
        &(&self.lower + &self.upper) * &Decimal::half()
    }

    /// Grow the bracket geometrically until `function - target` changes sign
    /// across it.
    ///
    /// Each step moves one end outward by the current width, clamped to the
    /// function's bounds. For monotone functions the side is chosen from the
    /// sign of the residual; otherwise the end closer to the target moves.
    ///
    /// # Errors
    /// `ApproximationError::InvalidBracket` if no sign change is found within
    /// `max_expansions` steps, or any error of the function.
    pub fn expand<E>(
        self,
        function: &dyn BoundedMathFunction<Decimal, Error = E>,
        target: &Decimal,
        ctx: &MathContext,
        max_expansions: usize,
    ) -> Result<Bracket, E>
    where
        E: From<ApproximationError>,
    {
        let wctx = working_context(ctx);
        let residual = |x: &Decimal| -> Result<Decimal, E> {
            Ok(&function.calculate_with(&wctx, x)? - target)
        };
        let lower_bound = function.lower_bound();
        let upper_bound = function.upper_bound();

        let Bracket {
            mut lower,
            mut upper,
        } = self;
        let mut lower_residual = residual(&lower)?;
        let mut upper_residual = residual(&upper)?;

        for expansion in 0..max_expansions {
            if lower_residual.signum() * upper_residual.signum() <= 0 {
                debug!(expansion, %lower, %upper, "bracket encloses a sign change");
                return Ok(Bracket { lower, upper });
            }
            let width = &upper - &lower;
            let at_lower_bound = lower_bound.as_ref().is_some_and(|b| lower <= *b);
            let at_upper_bound = upper_bound.as_ref().is_some_and(|b| upper >= *b);
            let move_upper = match function.monotonicity() {
                Monotonicity::Increasing => upper_residual.is_negative(),
                Monotonicity::Decreasing => upper_residual.is_positive(),
                Monotonicity::Unknown => upper_residual.abs() <= lower_residual.abs(),
            };
            if (move_upper && !at_upper_bound) || at_lower_bound {
                if at_upper_bound {
                    break;
                }
                let candidate = &upper + &width;
                upper = match &upper_bound {
                    Some(bound) if candidate > *bound => bound.clone(),
                    _ => candidate,
                };
                upper_residual = residual(&upper)?;
            } else {
                let candidate = &lower - &width;
                lower = match &lower_bound {
                    Some(bound) if candidate < *bound => bound.clone(),
                    _ => candidate,
                };
                lower_residual = residual(&lower)?;
            }
        }
        if lower_residual.signum() * upper_residual.signum() <= 0 {
            return Ok(Bracket { lower, upper });
        }
        Err(E::from(ApproximationError::InvalidBracket { lower, upper }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::test_functions::{bounded_square, cubic, unbounded_square};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_rejects_empty_interval() {
        assert!(Bracket::new(Decimal::one(), Decimal::one()).is_err());
        assert!(Bracket::new(Decimal::from(2), Decimal::one()).is_err());
        let bracket = Bracket::new(Decimal::from(-1), Decimal::from(3)).unwrap();
        assert_eq!(bracket.width(), Decimal::from(4));
        assert_eq!(bracket.midpoint(), Decimal::one());
    }

    #[test]
    fn test_from_bounds() {
        let bracket = Bracket::from_bounds(&bounded_square()).unwrap();
        assert_eq!(bracket.lower(), &Decimal::zero());
        assert_eq!(bracket.upper(), &Decimal::from(4));
        assert_eq!(
            Bracket::from_bounds(&unbounded_square()),
            Err(ApproximationError::UnboundedDomain)
        );
    }

    #[test]
    fn test_expand_upwards_for_increasing_function() {
        let f = unbounded_square();
        let start = Bracket::new(Decimal::zero(), Decimal::one()).unwrap();
        let bracket = start
            .expand(&f, &Decimal::from(50), &MathContext::DECIMAL64, 10)
            .unwrap();
        // 1 -> 2 -> 4 -> 8 encloses √50
        assert_eq!(bracket.upper(), &Decimal::from(8));
        assert_eq!(bracket.lower(), &Decimal::zero());
    }

    #[test]
    fn test_expand_clamps_to_bounds() {
        let f = cubic();
        let start = Bracket::new(dec("1.5"), dec("1.75")).unwrap();
        // x³ - x = -5 only below -1.9; the bracket has to reach the lower bound
        let bracket = start
            .expand(&f, &Decimal::from(-5), &MathContext::DECIMAL64, 20)
            .unwrap();
        assert_eq!(bracket.lower(), &Decimal::from(-2));
    }

    #[test]
    fn test_expand_gives_up() {
        let f = bounded_square();
        let start = Bracket::new(Decimal::one(), Decimal::from(2)).unwrap();
        let result: Result<Bracket, ApproximationError> =
            start.expand(&f, &Decimal::from(100), &MathContext::DECIMAL64, 5);
        assert!(matches!(result, Err(ApproximationError::InvalidBracket { .. })));
    }

    #[test]
    fn test_already_enclosing_bracket_is_kept() {
        let f = bounded_square();
        let start = Bracket::new(Decimal::one(), Decimal::from(2)).unwrap();
        let bracket = start
            .clone()
            .expand(&f, &Decimal::from(2), &MathContext::DECIMAL64, 0)
            .unwrap();
        assert_eq!(bracket, start);
    }
}
