//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required config file does not exist.
    #[error("config file {} does not exist", path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A config file exists but could not be read.
    #[error("could not read config file {}", path.display())]
    Unreadable {
        /// Path of the file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file extension or format name is neither `toml` nor `json`.
    #[error("unsupported config format `{0}`, expected toml or json")]
    UnsupportedFormat(String),

    /// Malformed TOML, including unknown keys.
    #[error("malformed TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, including unknown keys.
    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but is out of range.
    #[error("`{field}` is invalid: {reason}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `bus.max_middleware`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An environment override could not be parsed.
    #[error("environment override {var} is invalid: {reason}")]
    EnvOverride {
        /// Full variable name, e.g. `VIGIL__BUS__MAX_MIDDLEWARE`.
        var: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    /// Missing file.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    /// Unreadable file.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Unsupported format name or extension.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Out-of-range value for `field`.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Unparseable environment override.
    pub fn env_override(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// The field or variable this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            Self::EnvOverride { var, .. } => Some(var),
            _ => None,
        }
    }
}
