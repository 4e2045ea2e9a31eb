//! # infra_config
//!
//! Runtime settings for the numeric engine.
//!
//! This crate loads the default precision, rounding mode and approximation
//! budgets from TOML files and environment variables. It knows nothing about
//! decimals; `numeric_models::config` turns the settings into typed contexts.
//!
//! ## Architecture Position
//!
//! Part of the **I**nfra layer. Must not depend on any numeric crate.
//!
//! ## Example
//!
//! ```rust,ignore
//! use infra_config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Default precision: {}", settings.precision.digits);
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    canonical_rounding, ApproximationConfig, PrecisionConfig, Settings, ROUNDING_MODES,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ApproximationConfig, ConfigError, PrecisionConfig, Settings};
}
