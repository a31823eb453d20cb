//! Typed event bus with a bounded middleware pipeline.
//!
//! An [`EventBus`] delivers events to listeners by name. Before delivery,
//! every event passes through the bus's middleware chain, which can inspect,
//! transform, halt, or reject it.
//!
//! The chain is bounded. Each bus holds at most `max_middleware` entries
//! (20 by default); registering one more fails with
//! [`BusError::CapacityExceeded`] instead of silently slowing every dispatch.
//! [`EventBus::diagnostics`] reports how full the chain is.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vigil_bus::{BusEvent, EventBus};
//! use vigil_bus::stages::LoggingMiddleware;
//!
//! #[derive(Debug)]
//! enum SiteEvent {
//!     Added { identifier: String },
//! }
//!
//! impl BusEvent for SiteEvent {
//!     fn name(&self) -> &'static str {
//!         "site:added"
//!     }
//! }
//!
//! let bus = EventBus::<SiteEvent>::builder()
//!     .name("sites")
//!     .max_middleware(4)
//!     .build()
//!     .unwrap();
//!
//! bus.use_middleware(Arc::new(LoggingMiddleware::new())).unwrap();
//! bus.on("site:added", |event, meta| {
//!     let SiteEvent::Added { identifier } = event;
//!     println!("{identifier} added ({})", meta.correlation_id);
//! });
//!
//! let diagnostics = bus.diagnostics();
//! assert_eq!(diagnostics.middleware_count, 1);
//! assert_eq!(diagnostics.middleware_utilization, 25);
//! ```

#![doc(html_root_url = "https://docs.rs/vigil-bus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bus;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod listener;
pub mod middleware;
pub mod registry;
pub mod stages;

pub use bus::{EmitOutcome, EventBus, EventBusBuilder};
pub use context::EventContext;
pub use diagnostics::BusDiagnostics;
pub use error::{BusError, BusResult};
pub use event::{BusEvent, EventMeta};
pub use listener::{Listener, ListenerId};
pub use middleware::{from_fn, BoxFuture, BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use registry::MiddlewareRegistry;
