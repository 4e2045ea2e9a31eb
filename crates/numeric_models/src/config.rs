//! Typed views of [`infra_config::Settings`].

use infra_config::{ApproximationConfig, ConfigError, PrecisionConfig, Settings};
use numeric_core::types::{MathContext, RoundingMode};

use crate::distributions::QuantileConfig;

/// Default context described by `precision`.
///
/// # Errors
/// `ConfigError::InvalidValue` for zero digits or an unknown rounding mode.
pub fn math_context(precision: &PrecisionConfig) -> Result<MathContext, ConfigError> {
    let rounding = precision
        .rounding
        .parse::<RoundingMode>()
        .map_err(|e| ConfigError::InvalidValue {
            key: "precision.rounding".to_string(),
            message: e.to_string(),
        })?;
    MathContext::new(precision.digits, rounding).map_err(|e| ConfigError::InvalidValue {
        key: "precision.digits".to_string(),
        message: e.to_string(),
    })
}

impl From<&ApproximationConfig> for QuantileConfig {
    fn from(config: &ApproximationConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            warmup_iterations: config.warmup_iterations,
            warmup_digits: config.warmup_digits,
            max_expansions: config.max_expansions,
        }
    }
}

/// Context and quantile budgets taken from loaded settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineDefaults {
    pub context: MathContext,
    pub quantile: QuantileConfig,
}

impl EngineDefaults {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            context: math_context(&settings.precision)?,
            quantile: QuantileConfig::from(&settings.approximation),
        })
    }

    /// [`Settings::load`] followed by [`EngineDefaults::from_settings`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_settings(&Settings::load()?)
    }
}
