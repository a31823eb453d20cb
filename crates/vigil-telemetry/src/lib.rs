//! Logging setup for Vigil services.
//!
//! The bus itself only emits `tracing` events; this crate installs the
//! subscriber that formats them. Output is JSON by default and pretty in
//! development, filtered with an `EnvFilter` directive.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_config::ConfigLoader;
//! use vigil_telemetry::{init_logging, LogConfig};
//!
//! let config = ConfigLoader::new().with_env_prefix("VIGIL").load()?;
//! init_logging(&LogConfig::from(&config.logging))?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
