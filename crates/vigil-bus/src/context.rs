//! Per-dispatch context.
//!
//! An [`EventContext`] is created for every [`emit`](crate::EventBus::emit)
//! and handed to each middleware in turn. It carries the event metadata and
//! a typed extension map that lets earlier middleware leave data for later
//! ones.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::event::EventMeta;

/// Context that flows through the middleware chain for one event.
///
/// # Example
///
/// ```
/// use vigil_bus::{EventContext, EventMeta};
///
/// struct CheckAttempt(u32);
///
/// let mut ctx = EventContext::new(EventMeta::new("monitor", "site:checked"));
/// ctx.set_extension(CheckAttempt(2));
///
/// assert_eq!(ctx.event_name(), "site:checked");
/// assert_eq!(ctx.get_extension::<CheckAttempt>().map(|a| a.0), Some(2));
/// ```
#[derive(Debug)]
pub struct EventContext {
    meta: EventMeta,
    started_at: Instant,
    chain_completed: bool,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl EventContext {
    /// Creates a context for the given metadata.
    #[must_use]
    pub fn new(meta: EventMeta) -> Self {
        Self {
            meta,
            started_at: Instant::now(),
            chain_completed: false,
            extensions: HashMap::new(),
        }
    }

    /// Returns the event metadata.
    #[must_use]
    pub fn meta(&self) -> &EventMeta {
        &self.meta
    }

    /// Consumes the context, returning its metadata.
    #[must_use]
    pub fn into_meta(self) -> EventMeta {
        self.meta
    }

    /// Returns the event name.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        self.meta.event_name
    }

    /// Returns the correlation ID of this emit.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.meta.correlation_id
    }

    /// Returns the elapsed time since the event was emitted.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether every middleware passed the event on.
    ///
    /// Only meaningful once the chain has returned: `false` means some
    /// middleware short-circuited and listeners will not be notified.
    #[must_use]
    pub fn chain_completed(&self) -> bool {
        self.chain_completed
    }

    pub(crate) fn mark_chain_completed(&mut self) {
        self.chain_completed = true;
    }

    /// Stores a typed extension value, replacing any previous value of that type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}
