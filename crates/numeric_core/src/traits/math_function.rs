//! Evaluable single-argument functions.

use crate::types::MathContext;

/// Declared monotonic behaviour of a function over its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Monotonicity {
    Increasing,
    Decreasing,
    #[default]
    Unknown,
}

impl Monotonicity {
    /// `true` for `Increasing` and `Decreasing`.
    pub fn is_monotone(self) -> bool {
        !matches!(self, Monotonicity::Unknown)
    }
}

/// A function of one argument evaluated under an explicit [`MathContext`].
///
/// # Type Parameters
///
/// * `T` - Argument and result type (e.g., `Decimal`, `ExactRational`)
///
/// # Contract
///
/// - `calculate_with(ctx, x)` returns the value rounded to `ctx` or a
///   categorised error; it never returns a sentinel value
/// - `calculate(x)` is `calculate_with(&MathContext::DEFAULT, x)`
/// - `monotonicity()` is a promise callers may rely on when solving
///
/// # Example
///
/// ```
/// use numeric_core::traits::{FnMathFunction, MathFunction, Monotonicity};
/// use numeric_core::types::{Decimal, MathContext, NumericError};
///
/// let square = FnMathFunction::new(
///     |_ctx: &MathContext, x: &Decimal| Ok::<_, NumericError>(x * x),
///     Monotonicity::Unknown,
/// );
/// assert_eq!(square.calculate(&Decimal::from(7)).unwrap(), Decimal::from(49));
/// ```
pub trait MathFunction<T> {
    /// Error reported when evaluation fails.
    type Error;

    /// Evaluate at `x` under `ctx`.
    fn calculate_with(&self, ctx: &MathContext, x: &T) -> Result<T, Self::Error>;

    /// Evaluate at `x` under [`MathContext::DEFAULT`].
    fn calculate(&self, x: &T) -> Result<T, Self::Error> {
        self.calculate_with(&MathContext::DEFAULT, x)
    }

    fn monotonicity(&self) -> Monotonicity {
        Monotonicity::Unknown
    }
}

/// A [`MathFunction`] with an optionally bounded domain.
///
/// `None` on either side means the domain is unbounded in that direction.
/// Solvers use the bounds to build brackets and to keep iterates inside
/// the domain.
pub trait BoundedMathFunction<T>: MathFunction<T> {
    fn lower_bound(&self) -> Option<T> {
        None
    }

    fn upper_bound(&self) -> Option<T> {
        None
    }
}

/// Adapter turning a closure into a [`MathFunction`].
#[derive(Clone)]
pub struct FnMathFunction<F> {
    function: F,
    monotonicity: Monotonicity,
}

impl<F> FnMathFunction<F> {
    pub fn new(function: F, monotonicity: Monotonicity) -> Self {
        Self {
            function,
            monotonicity,
        }
    }
}

impl<T, E, F> MathFunction<T> for FnMathFunction<F>
where
    F: Fn(&MathContext, &T) -> Result<T, E>,
{
    type Error = E;

    fn calculate_with(&self, ctx: &MathContext, x: &T) -> Result<T, E> {
        (self.function)(ctx, x)
    }

    fn monotonicity(&self) -> Monotonicity {
        self.monotonicity
    }
}

impl<T, E, F> BoundedMathFunction<T> for FnMathFunction<F> where
    F: Fn(&MathContext, &T) -> Result<T, E>
{
}

/// Attaches domain bounds to any [`MathFunction`].
///
/// # Example
///
/// ```
/// use numeric_core::math::elementary;
/// use numeric_core::traits::{Bounded, BoundedMathFunction, FnMathFunction, Monotonicity};
/// use numeric_core::types::{Decimal, MathContext};
///
/// let ln = Bounded::new(
///     FnMathFunction::new(
///         |ctx: &MathContext, x: &Decimal| elementary::ln(x, ctx),
///         Monotonicity::Increasing,
///     ),
///     Some(Decimal::zero()),
///     None,
/// );
/// assert_eq!(ln.lower_bound(), Some(Decimal::zero()));
/// assert!(ln.upper_bound().is_none());
/// ```
#[derive(Clone)]
pub struct Bounded<F, T> {
    function: F,
    lower: Option<T>,
    upper: Option<T>,
}

impl<F, T> Bounded<F, T> {
    pub fn new(function: F, lower: Option<T>, upper: Option<T>) -> Self {
        Self {
            function,
            lower,
            upper,
        }
    }

    pub fn inner(&self) -> &F {
        &self.function
    }
}

impl<F, T> MathFunction<T> for Bounded<F, T>
where
    F: MathFunction<T>,
{
    type Error = F::Error;

    fn calculate_with(&self, ctx: &MathContext, x: &T) -> Result<T, Self::Error> {
        self.function.calculate_with(ctx, x)
    }

    fn monotonicity(&self) -> Monotonicity {
        self.function.monotonicity()
    }
}

impl<F, T> BoundedMathFunction<T> for Bounded<F, T>
where
    F: MathFunction<T>,
    T: Clone,
{
    fn lower_bound(&self) -> Option<T> {
        self.lower.clone()
    }

    fn upper_bound(&self) -> Option<T> {
        self.upper.clone()
    }
}
