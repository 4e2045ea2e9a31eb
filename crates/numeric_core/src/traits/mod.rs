//! Core function abstractions.
//!
//! This module defines the contract shared by every evaluable object in the
//! workspace: polynomials, rational functions, distribution functions and the
//! closures handed to the approximation strategies.

pub mod math_function;

pub use math_function::{Bounded, BoundedMathFunction, FnMathFunction, MathFunction, Monotonicity};
