//! Event trait and per-dispatch metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An event that can travel over an [`EventBus`](crate::EventBus).
///
/// Events are usually an enum with one variant per event kind. The name
/// selects which listeners receive the event.
///
/// # Example
///
/// ```
/// use vigil_bus::BusEvent;
///
/// enum SiteEvent {
///     Added { identifier: String },
///     Removed { identifier: String },
/// }
///
/// impl BusEvent for SiteEvent {
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Added { .. } => "site:added",
///             Self::Removed { .. } => "site:removed",
///         }
///     }
/// }
/// ```
pub trait BusEvent: Send + Sync + 'static {
    /// The event name listeners subscribe to.
    fn name(&self) -> &'static str;
}

/// Metadata attached to every emitted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMeta {
    /// Name of the bus that dispatched the event.
    pub bus_id: String,
    /// Unique ID for this emit (UUID v7, time ordered).
    pub correlation_id: Uuid,
    /// Event name as seen when the event was emitted.
    pub event_name: &'static str,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
}

impl EventMeta {
    /// Creates metadata with a fresh correlation ID.
    pub fn new(bus_id: impl Into<String>, event_name: &'static str) -> Self {
        Self {
            bus_id: bus_id.into(),
            correlation_id: Uuid::now_v7(),
            event_name,
            timestamp: Utc::now(),
        }
    }
}
