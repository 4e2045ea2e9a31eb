//! Settings and configuration structures.

use std::path::Path;

use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Rounding mode names accepted in `precision.rounding`.
pub const ROUNDING_MODES: [&str; 7] = [
    "UP",
    "DOWN",
    "CEILING",
    "FLOOR",
    "HALF_UP",
    "HALF_DOWN",
    "HALF_EVEN",
];

/// Main application settings.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Settings {
    /// Default precision and rounding
    #[serde(default)]
    pub precision: PrecisionConfig,
    /// Approximation budgets
    #[serde(default)]
    pub approximation: ApproximationConfig,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `NUMERIC_ENV`)
    /// 3. Environment variables prefixed with `NUMERIC__`, e.g. `NUMERIC__PRECISION__DIGITS`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Same as [`Settings::load`] with the configuration directory given explicitly.
    pub fn load_from(directory: &Path) -> Result<Self, ConfigError> {
        let env = match std::env::var("NUMERIC_ENV") {
            Ok(env) => env,
            Err(std::env::VarError::NotPresent) => "development".into(),
            Err(e) => return Err(ConfigError::EnvError(e.to_string())),
        };

        let config = Config::builder()
            .add_source(File::from(directory.join("default")).required(false))
            .add_source(File::from(directory.join(&env)).required(false))
            .add_source(
                Environment::with_prefix("NUMERIC")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a single TOML file; it must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision.digits == 0 {
            return Err(ConfigError::invalid(
                "precision.digits",
                "must be at least one digit",
            ));
        }
        if canonical_rounding(&self.precision.rounding).is_none() {
            return Err(ConfigError::invalid(
                "precision.rounding",
                format!(
                    "unknown rounding mode '{}', expected one of {}",
                    self.precision.rounding,
                    ROUNDING_MODES.join(", ")
                ),
            ));
        }
        if self.approximation.warmup_digits == Some(0) {
            return Err(ConfigError::invalid(
                "approximation.warmup_digits",
                "must be at least one digit when set",
            ));
        }
        if self.approximation.warmup_iterations > self.approximation.max_iterations {
            return Err(ConfigError::invalid(
                "approximation.warmup_iterations",
                format!(
                    "{} exceeds max_iterations {}",
                    self.approximation.warmup_iterations, self.approximation.max_iterations
                ),
            ));
        }
        Ok(())
    }
}

/// Canonical name of a rounding mode, accepting any case, `-` for `_` and
/// the compact `HALFEVEN` spellings.
pub fn canonical_rounding(name: &str) -> Option<&'static str> {
    let normalized = name.trim().to_ascii_uppercase().replace('-', "_");
    let normalized = match normalized.as_str() {
        "HALFUP" => "HALF_UP",
        "HALFDOWN" => "HALF_DOWN",
        "HALFEVEN" => "HALF_EVEN",
        other => other,
    };
    ROUNDING_MODES.iter().copied().find(|mode| *mode == normalized)
}

/// Default precision and rounding.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PrecisionConfig {
    /// Significant decimal digits
    #[serde(default = "default_digits")]
    pub digits: u64,
    /// Rounding mode name, e.g. `HALF_EVEN`
    #[serde(default = "default_rounding")]
    pub rounding: String,
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            digits: default_digits(),
            rounding: default_rounding(),
        }
    }
}

fn default_digits() -> u64 {
    34
}

fn default_rounding() -> String {
    "HALF_EVEN".to_string()
}

/// Approximation budgets.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApproximationConfig {
    /// Total iteration budget of a solve
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Iterations granted to the warm-up stage
    #[serde(default = "default_warmup_iterations")]
    pub warmup_iterations: usize,
    /// Precision of the warm-up stage; absent means full precision
    #[serde(default = "default_warmup_digits")]
    pub warmup_digits: Option<u64>,
    /// Maximum geometric bracket expansions
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

impl Default for ApproximationConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            warmup_iterations: default_warmup_iterations(),
            warmup_digits: default_warmup_digits(),
            max_expansions: default_max_expansions(),
        }
    }
}

fn default_max_iterations() -> usize {
    1500
}

fn default_warmup_iterations() -> usize {
    300
}

fn default_warmup_digits() -> Option<u64> {
    Some(16)
}

fn default_max_expansions() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.precision.digits, 34);
        assert_eq!(settings.precision.rounding, "HALF_EVEN");
        assert_eq!(settings.approximation.max_iterations, 1500);
        assert_eq!(settings.approximation.warmup_iterations, 300);
        assert_eq!(settings.approximation.warmup_digits, Some(16));
        assert_eq!(settings.approximation.max_expansions, 64);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [precision]
            digits = 128
            "#,
        )
        .unwrap();
        assert_eq!(settings.precision.digits, 128);
        assert_eq!(settings.precision.rounding, "HALF_EVEN");
        assert_eq!(settings.approximation, ApproximationConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let settings = Settings::from_toml(
            r#"
            [precision]
            digits = 50
            rounding = "half_up"

            [approximation]
            max_iterations = 200
            warmup_iterations = 20
            warmup_digits = 12
            max_expansions = 8
            "#,
        )
        .unwrap();
        assert_eq!(settings.precision.rounding, "half_up");
        assert_eq!(settings.approximation.max_iterations, 200);
        assert_eq!(settings.approximation.warmup_digits, Some(12));
        assert_eq!(settings.approximation.max_expansions, 8);
    }

    #[test]
    fn test_zero_digits_rejected() {
        let result = Settings::from_toml("[precision]\ndigits = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "precision.digits"
        ));
    }

    #[test]
    fn test_unknown_rounding_rejected() {
        let result = Settings::from_toml("[precision]\nrounding = \"SIDEWAYS\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "precision.rounding"
        ));
    }

    #[test]
    fn test_rounding_spellings() {
        assert_eq!(canonical_rounding("half-even"), Some("HALF_EVEN"));
        assert_eq!(canonical_rounding("HALFEVEN"), Some("HALF_EVEN"));
        assert_eq!(canonical_rounding(" Half_Down "), Some("HALF_DOWN"));
        assert_eq!(canonical_rounding("ceiling"), Some("CEILING"));
        assert_eq!(canonical_rounding("HALF EVEN"), None);

        for name in ["half-even", "HALFUP", "floor"] {
            let toml = format!("[precision]\nrounding = \"{}\"\n", name);
            assert!(Settings::from_toml(&toml).is_ok(), "{} rejected", name);
        }
    }

    #[test]
    fn test_warmup_larger_than_budget_rejected() {
        let result = Settings::from_toml(
            "[approximation]\nmax_iterations = 10\nwarmup_iterations = 20\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = Settings::from_file(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_repository_defaults_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
