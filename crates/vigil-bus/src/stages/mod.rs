//! Built-in middleware.
//!
//! None of these are registered by default; each one takes a registry slot
//! when added with [`EventBus::use_middleware`](crate::EventBus::use_middleware).
//! Use [`compose()`] to fit several of them into a single slot.
//!
//! - [`logging`] - Log every event with its correlation ID and timing
//! - [`metrics`] - Count events and record dispatch durations
//! - [`rate_limit`] - Drop events that exceed a per-name rate
//! - [`validation`] - Reject events that fail per-name rules
//! - [`compose`](mod@compose) - Combine several middleware into one

pub mod compose;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod validation;

pub use compose::{compose, ComposedMiddleware};
pub use logging::LoggingMiddleware;
pub use metrics::MetricsMiddleware;
pub use rate_limit::{RateLimitBuilder, RateLimitMiddleware};
pub use validation::ValidationMiddleware;
