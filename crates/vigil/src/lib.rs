//! # Vigil
//!
//! **Typed event bus with a bounded middleware pipeline**
//!
//! Vigil carries application events (sites added, removed, checked) from
//! producers to listeners through an ordered middleware chain:
//!
//! - **Bounded chain**: each bus holds at most `max_middleware` middleware
//!   and rejects registrations beyond that
//! - **Diagnostics**: middleware count, capacity and utilization on demand
//! - **Built-in stages**: logging, metrics, rate limiting, validation, and
//!   composition
//! - **Layered configuration**: defaults, TOML/JSON files, `VIGIL__*`
//!   environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vigil::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("vigil.toml")?
//!         .with_env_prefix("VIGIL")
//!         .load()?;
//!     init_logging(&LogConfig::from(&config.logging))?;
//!
//!     let bus = EventBus::<SiteEvent>::with_config(&config.bus)?;
//!     bus.use_middleware(Arc::new(LoggingMiddleware::new()))?;
//!     bus.on("site:added", |event, meta| println!("{event:?} {}", meta.correlation_id));
//!
//!     bus.emit(SiteEvent::Added { identifier: "example.com".into() }).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! emit → middleware 1 → middleware 2 → … → listeners for event name
//!            │ (no next)       │ (Err)
//!            ▼                 ▼
//!         halted            error returned
//! ```

#![doc(html_root_url = "https://docs.rs/vigil/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the event bus
pub use vigil_bus as bus;

// Re-export configuration types
pub use vigil_config as config;

// Re-export logging setup
pub use vigil_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use vigil::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    pub use vigil_bus::{
        from_fn, BoxFuture, BoxedMiddleware, BusDiagnostics, BusError, BusEvent, BusResult,
        EmitOutcome, EventBus, EventBusBuilder, EventContext, EventMeta, ListenerId, Middleware,
        Next,
    };

    // Re-export built-in middleware
    pub use vigil_bus::stages::{
        compose, LoggingMiddleware, MetricsMiddleware, RateLimitMiddleware, ValidationMiddleware,
    };

    // Re-export configuration
    pub use vigil_config::{BusConfig, ConfigError, ConfigLoader, VigilConfig};

    // Re-export logging setup
    pub use vigil_telemetry::{init_logging, LogConfig, TelemetryError};
}
