//! Configuration schema types.
//!
//! This module defines the structure of each configuration section.

use serde::{Deserialize, Serialize};

/// Default middleware capacity of an event bus.
pub const DEFAULT_MAX_MIDDLEWARE: usize = 20;

/// Default advisory listener limit per event name.
pub const DEFAULT_MAX_LISTENERS: usize = 100;

/// Event bus configuration section.
///
/// # Example
///
/// ```
/// use vigil_config::BusConfig;
///
/// let config = BusConfig {
///     name: "site-events".to_string(),
///     max_middleware: 5,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Human-readable bus name, used in logs and diagnostics.
    #[serde(default = "default_bus_name")]
    pub name: String,

    /// Maximum number of middleware the bus holds at once.
    #[serde(default = "default_max_middleware")]
    pub max_middleware: usize,

    /// Listener count per event name above which a leak warning is logged.
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: default_bus_name(),
            max_middleware: DEFAULT_MAX_MIDDLEWARE,
            max_listeners: DEFAULT_MAX_LISTENERS,
        }
    }
}

impl BusConfig {
    /// Create a configuration with the given middleware capacity.
    pub fn with_max_middleware(mut self, max: usize) -> Self {
        self.max_middleware = max;
        self
    }

    /// Set the advisory listener limit.
    pub fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = max;
        self
    }

    /// Set the bus name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Validate the section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the name is empty or either
    /// limit is zero.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.name.trim().is_empty() {
            return Err(crate::ConfigError::invalid_value(
                "bus.name",
                "must not be empty",
            ));
        }
        if self.max_middleware == 0 {
            return Err(crate::ConfigError::invalid_value(
                "bus.max_middleware",
                "must be at least 1",
            ));
        }
        if self.max_listeners == 0 {
            return Err(crate::ConfigError::invalid_value(
                "bus.max_listeners",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_bus_name() -> String {
    "vigil".to_string()
}

const fn default_max_middleware() -> usize {
    DEFAULT_MAX_MIDDLEWARE
}

const fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs.
    #[default]
    Json,
    /// Human-readable pretty format.
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (e.g. `info`, `vigil_bus=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_defaults() {
        let config = BusConfig::default();
        assert_eq!(config.name, "vigil");
        assert_eq!(config.max_middleware, 20);
        assert_eq!(config.max_listeners, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bus_zero_capacity_rejected() {
        let err = BusConfig::default()
            .with_max_middleware(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("bus.max_middleware"));
    }

    #[test]
    fn test_bus_blank_name_rejected() {
        let err = BusConfig::default().with_name("  ").validate().unwrap_err();
        assert!(err.to_string().contains("bus.name"));
    }

    #[test]
    fn test_partial_bus_section_uses_defaults() {
        let config: BusConfig = toml::from_str("max_middleware = 4").unwrap();
        assert_eq!(config.max_middleware, 4);
        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
        assert_eq!(config.name, "vigil");
    }

    #[test]
    fn test_unknown_bus_field_rejected() {
        let result: Result<BusConfig, _> = toml::from_str("max_handlers = 4");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_serde() {
        let config: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.enabled);
    }
}
