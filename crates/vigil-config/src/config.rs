//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{BusConfig, ConfigError, LogFormat, LoggingConfig};

/// Complete Vigil configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use vigil_config::VigilConfig;
///
/// let config = VigilConfig::default();
/// assert_eq!(config.bus.max_middleware, 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    /// Event bus configuration.
    #[serde(default)]
    pub bus: BusConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VigilConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error, or `ConfigError::InvalidValue` for
    /// an empty log level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bus.validate()?;

        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty when logging is enabled",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty, colored, debug-level logs.
    ///
    /// # Example
    ///
    /// ```
    /// use vigil_config::{LogFormat, VigilConfig};
    ///
    /// let config = VigilConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config
    }

    /// Production preset: JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config
    }
}
