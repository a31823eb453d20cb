//! Error types for the event bus.

use thiserror::Error;
use vigil_config::ConfigError;

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Errors raised by the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The middleware registry is full.
    ///
    /// Raised by [`EventBus::use_middleware`](crate::EventBus::use_middleware)
    /// when the bus already holds `max` middleware. The registry is left
    /// unchanged.
    #[error(
        "Maximum middleware limit ({max}) exceeded. Consider increasing max_middleware or combining middleware functions."
    )]
    CapacityExceeded {
        /// The configured capacity.
        max: usize,
    },

    /// A middleware refused to pass an event on.
    #[error("event rejected by middleware `{middleware}`: {reason}")]
    Rejected {
        /// Name of the rejecting middleware.
        middleware: String,
        /// Why the event was rejected.
        reason: String,
    },

    /// The bus configuration is invalid.
    #[error("invalid bus configuration: {0}")]
    Config(#[from] ConfigError),
}

impl BusError {
    /// Create a capacity exceeded error.
    pub fn capacity_exceeded(max: usize) -> Self {
        Self::CapacityExceeded { max }
    }

    /// Create a rejection error.
    pub fn rejected(middleware: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            middleware: middleware.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a capacity error.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}
