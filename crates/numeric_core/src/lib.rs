//! # numeric_core
//!
//! Arbitrary-precision arithmetic kernel.
//!
//! This crate provides the values and functions every higher layer builds on:
//! - Decimal values with explicit precision and rounding (`types`)
//! - Exact rational arithmetic (`types::rational`)
//! - Elementary and gamma functions, lazy irrational expressions,
//!   polynomials and rational functions (`math`)
//! - The `MathFunction` abstraction shared by solvers and distributions (`traits`)
//!
//! ## Architecture Position
//!
//! Foundation layer (L1). Must not depend on any other workspace crate.
//!
//! ## Example
//!
//! ```rust
//! use numeric_core::math::elementary;
//! use numeric_core::types::{Decimal, MathContext, RoundingMode};
//!
//! let ctx = MathContext::new(20, RoundingMode::HalfEven).unwrap();
//! let root_two = elementary::sqrt(&Decimal::from(2), &ctx).unwrap();
//! assert_eq!(root_two.to_string(), "1.4142135623730950488");
//! ```

pub mod math;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::math::{Irrational, Polynom, RationalFunction};
    pub use crate::traits::{BoundedMathFunction, MathFunction, Monotonicity};
    pub use crate::types::{Decimal, ExactRational, MathContext, NumericError, RoundingMode};
}
