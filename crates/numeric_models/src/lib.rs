//! # numeric_models
//!
//! Special functions and probability distributions at arbitrary precision.
//!
//! This crate provides:
//! - Incomplete gamma strategies: series, continued fraction, automatic (`algorithms`)
//! - Gamma and normal distributions with density, CDF, quantile and inverse density (`distributions`)
//! - Typed defaults built from `infra_config` settings (`config`)
//! - Distribution errors (`error`)
//!
//! ## Architecture Position
//!
//! Models layer (L3). Depends on `numeric_core` for arithmetic, on
//! `numeric_approx` for inverting monotone functions and on `infra_config`
//! for runtime defaults.
//!
//! ## Example
//!
//! ```rust
//! use numeric_core::types::{Decimal, MathContext};
//! use numeric_models::prelude::*;
//!
//! let dist = GammaDistribution::new(Decimal::from(2), Decimal::from(3)).unwrap();
//! let ctx = MathContext::DECIMAL64;
//! let p = dist.cdf(&ctx, &Decimal::from(4)).unwrap();
//! assert_eq!(p.to_string(), "0.3849400110633042");
//! ```

pub mod algorithms;
pub mod config;
pub mod distributions;
pub mod error;

pub use algorithms::{
    AlgorithmStrategy, IncompleteGamma, IncompleteGammaContinuedFraction, IncompleteGammaSeries,
    Regularization,
};
pub use config::EngineDefaults;
pub use distributions::{
    Distribution, DistributionFunction, GammaDistribution, NormalDistribution, QuantileConfig,
};
pub use error::DistributionError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::{AlgorithmStrategy, IncompleteGamma, Regularization};
    pub use crate::config::EngineDefaults;
    pub use crate::distributions::{
        Distribution, GammaDistribution, NormalDistribution, QuantileConfig,
    };
    pub use crate::error::DistributionError;
}
