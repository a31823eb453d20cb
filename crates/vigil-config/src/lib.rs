//! Typed configuration for Vigil.
//!
//! Supports:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [bus]
//! name = "site-events"
//! max_middleware = 20
//! max_listeners = 100
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables, e.g.
//! `VIGIL__BUS__MAX_MIDDLEWARE=32` or `VIGIL__LOGGING__FORMAT=pretty`.

#![doc(html_root_url = "https://docs.rs/vigil-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::VigilConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    BusConfig, LogFormat, LoggingConfig, DEFAULT_MAX_LISTENERS, DEFAULT_MAX_MIDDLEWARE,
};
