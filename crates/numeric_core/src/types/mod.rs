//! Core numeric types.
//!
//! This module provides:
//! - `context`: Precision and rounding descriptors (`MathContext`, `RoundingMode`)
//! - `decimal`: Arbitrary-precision decimal values
//! - `rational`: Exact fractions over big integers
//! - `error`: Structured error types for numeric operations

pub mod context;
pub mod decimal;
pub mod error;
pub mod rational;

pub use context::{MathContext, RoundingMode};
pub use decimal::Decimal;
pub use error::NumericError;
pub use rational::ExactRational;
