//! Arbitrary-precision mathematical functions.
//!
//! ## Submodules
//! - `elementary`: `exp`, `ln`, `sqrt`, `pow`, `powi` and `pi` on decimals
//! - `gamma`: The gamma function and its logarithm
//! - `irrational`: Lazily evaluated expressions rounded once on demand
//! - `polynom`: Polynomials with exact rational coefficients
//! - `rational_function`: Quotients of exactly evaluated functions

pub mod elementary;
pub mod gamma;
pub mod irrational;
pub mod polynom;
pub mod rational_function;

pub use elementary::GUARD_DIGITS;
pub use irrational::Irrational;
pub use polynom::Polynom;
pub use rational_function::RationalFunction;
