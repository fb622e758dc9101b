use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables shared by `GeodesicRegression` and `GroupedManifoldLm`.
///
/// Serialized as TOML; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// L2 penalty of the tangent-space ridge solve. Scaled internally by the total weight.
    pub ridge_penalty: f64,
    /// Evaluate per-observation log maps and per-group subspace fits on the rayon pool.
    pub parallel: bool,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            ridge_penalty: 0.0,
            parallel: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration to TOML: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Ridge penalty must be finite and non-negative, got {0}")]
    InvalidPenalty(f64),
}

impl RegressionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ridge_penalty.is_finite() || self.ridge_penalty < 0.0 {
            return Err(ConfigError::InvalidPenalty(self.ridge_penalty));
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = RegressionConfig::from_toml_str("ridge_penalty = 0.25\n").unwrap();
        assert_eq!(config.ridge_penalty, 0.25);
        assert!(config.parallel);

        let empty = RegressionConfig::from_toml_str("").unwrap();
        assert_eq!(empty, RegressionConfig::default());
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = RegressionConfig {
            ridge_penalty: 1.5,
            parallel: false,
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("ridge_penalty = 1.5"));
        assert_eq!(RegressionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_negative_penalty_and_bad_toml() {
        assert!(matches!(
            RegressionConfig::from_toml_str("ridge_penalty = -1.0"),
            Err(ConfigError::InvalidPenalty(_))
        ));
        assert!(matches!(
            RegressionConfig::from_toml_str("ridge_penalty = \"high\""),
            Err(ConfigError::TomlParseError(_))
        ));
    }
}
