//! Integration tests for numeric_approx strategies against numeric_core functions.

use approx::assert_relative_eq;
use numeric_approx::prelude::*;
use numeric_core::math::{elementary, Polynom};
use numeric_core::prelude::*;
use numeric_core::traits::{Bounded, FnMathFunction};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Error type of a caller that wraps both layers.
#[derive(Debug, PartialEq)]
enum CallerError {
    Numeric(NumericError),
    Approximation(ApproximationError),
}

impl From<NumericError> for CallerError {
    fn from(error: NumericError) -> Self {
        CallerError::Numeric(error)
    }
}

impl From<ApproximationError> for CallerError {
    fn from(error: ApproximationError) -> Self {
        CallerError::Approximation(error)
    }
}

#[test]
fn test_cube_root_with_all_strategies() {
    let cube = Bounded::new(
        FnMathFunction::new(
            |ctx: &MathContext, x: &Decimal| {
                elementary::powi(x, 3, ctx).map_err(CallerError::from)
            },
            Monotonicity::Increasing,
        ),
        Some(Decimal::zero()),
        Some(Decimal::from(3)),
    );
    let slope = FnMathFunction::new(
        |ctx: &MathContext, x: &Decimal| {
            Ok::<_, CallerError>((&(x * x) * &Decimal::from(3)).round(ctx))
        },
        Monotonicity::Unknown,
    );
    let problem = ApproximationProblem::new(&cube, Decimal::from(5)).with_derivative(&slope);
    let ctx = MathContext::new(25, RoundingMode::HalfEven).unwrap();
    let expected = dec("1.709975946676696989353109");

    let bisection = Bisection::new().approximate(&problem, &ctx).unwrap();
    let newton = NewtonRaphson::new().approximate(&problem, &ctx).unwrap();
    let chained = ChainedApproximation::new().approximate(&problem, &ctx).unwrap();
    assert_eq!(bisection.value, expected);
    assert_eq!(newton.value, expected);
    assert_eq!(chained.value, expected);
    assert!(newton.iterations < bisection.iterations);
}

#[test]
fn test_function_errors_propagate_unchanged() {
    let ln = Bounded::new(
        FnMathFunction::new(
            |ctx: &MathContext, x: &Decimal| elementary::ln(x, ctx).map_err(CallerError::from),
            Monotonicity::Increasing,
        ),
        Some(Decimal::from(-1)),
        Some(Decimal::from(3)),
    );
    let problem = ApproximationProblem::new(&ln, Decimal::zero());
    let result = Bisection::new().run(&problem, &MathContext::DECIMAL64);
    assert!(matches!(
        result,
        Err(CallerError::Numeric(NumericError::Domain { function: "ln", .. }))
    ));
}

#[test]
fn test_strategy_errors_convert_into_caller_error() {
    let poly = Polynom::from_integers(&[1, 0, 1]).unwrap();
    let shifted = Bounded::new(
        FnMathFunction::new(
            move |ctx: &MathContext, x: &Decimal| {
                MathFunction::<Decimal>::calculate_with(&poly, ctx, x).map_err(CallerError::from)
            },
            Monotonicity::Unknown,
        ),
        Some(Decimal::from(-1)),
        Some(Decimal::one()),
    );
    // x² + 1 = 0 has no real root
    let problem = ApproximationProblem::new(&shifted, Decimal::zero());
    let result = Bisection::new().run(&problem, &MathContext::DECIMAL64);
    assert!(matches!(
        result,
        Err(CallerError::Approximation(ApproximationError::InvalidBracket { .. }))
    ));
}

#[test]
fn test_expanded_bracket_feeds_bisection() {
    let exp = Bounded::new(
        FnMathFunction::new(
            |ctx: &MathContext, x: &Decimal| elementary::exp(x, ctx).map_err(CallerError::from),
            Monotonicity::Increasing,
        ),
        None,
        None,
    );
    let target = Decimal::from(1_000_000);
    let ctx = MathContext::DECIMAL64;
    let bracket = Bracket::new(Decimal::zero(), Decimal::one())
        .unwrap()
        .expand(&exp, &target, &ctx, 16)
        .unwrap();
    let problem = ApproximationProblem::new(&exp, target).with_bracket(bracket);
    let result = Bisection::new().approximate(&problem, &ctx).unwrap();
    assert_relative_eq!(result.value.to_f64(), 13.815510557964274, max_relative = 1e-15);
}

#[test]
fn test_non_convergence_keeps_best_estimate() {
    let exp = Bounded::new(
        FnMathFunction::new(
            |ctx: &MathContext, x: &Decimal| elementary::exp(x, ctx).map_err(CallerError::from),
            Monotonicity::Increasing,
        ),
        Some(Decimal::zero()),
        Some(Decimal::from(4)),
    );
    let problem = ApproximationProblem::new(&exp, Decimal::from(10)).with_max_iterations(20);
    match Bisection::new().approximate(&problem, &MathContext::DECIMAL128) {
        Err(CallerError::Approximation(ApproximationError::NonConvergence {
            best_estimate,
            iterations,
        })) => {
            assert_eq!(iterations, 20);
            assert_relative_eq!(best_estimate.to_f64(), 10f64.ln(), max_relative = 1e-5);
        }
        other => panic!("Expected NonConvergence error, got {:?}", other),
    }
}
