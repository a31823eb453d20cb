//! The typed event bus.

use std::sync::Arc;

use tracing::{debug, error};
use vigil_config::BusConfig;

use crate::context::EventContext;
use crate::diagnostics::BusDiagnostics;
use crate::error::BusResult;
use crate::event::{BusEvent, EventMeta};
use crate::listener::{ListenerId, ListenerTable};
use crate::middleware::{BoxedMiddleware, Next};
use crate::registry::MiddlewareRegistry;

/// Result of a single [`EventBus::emit`].
#[derive(Debug)]
pub struct EmitOutcome<E> {
    /// The event as the listeners saw it, after any middleware changes.
    pub event: E,
    /// Metadata of this emit.
    pub meta: EventMeta,
    /// How many listeners were called.
    pub listeners_notified: usize,
    /// Whether a middleware stopped the event before listeners.
    pub halted: bool,
}

/// A typed event bus with a bounded middleware chain.
///
/// Every emitted event passes through the registered middleware, in the
/// order they were added, before reaching the listeners registered for its
/// name. The chain holds at most `max_middleware` entries; see
/// [`use_middleware`](Self::use_middleware).
///
/// The bus is `Send + Sync`; share it with an `Arc`.
///
/// # Example
///
/// ```
/// use vigil_bus::{BusEvent, EventBus, from_fn};
///
/// #[derive(Debug)]
/// struct SiteAdded(String);
///
/// impl BusEvent for SiteAdded {
///     fn name(&self) -> &'static str {
///         "site:added"
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let bus = EventBus::<SiteAdded>::new();
/// bus.on("site:added", |event, _meta| println!("added {}", event.0));
///
/// let upper = from_fn::<SiteAdded, _>("uppercase", |ctx, event, next| {
///     Box::pin(async move {
///         event.0 = event.0.to_uppercase();
///         next.run(ctx, event).await
///     })
/// });
/// bus.use_middleware(upper).unwrap();
///
/// let outcome = bus.emit(SiteAdded("example.com".into())).await.unwrap();
/// assert_eq!(outcome.event.0, "EXAMPLE.COM");
/// assert_eq!(outcome.listeners_notified, 1);
/// # });
/// ```
pub struct EventBus<E> {
    name: String,
    middleware: MiddlewareRegistry<E>,
    listeners: ListenerTable<E>,
}

impl<E: BusEvent> EventBus<E> {
    /// Creates a bus with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(&BusConfig::default())
    }

    /// Creates a bus from a configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Config`](crate::BusError::Config) if the section
    /// does not validate, for example when `max_middleware` is zero.
    pub fn with_config(config: &BusConfig) -> BusResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> EventBusBuilder<E> {
        EventBusBuilder::new()
    }

    fn from_valid_config(config: &BusConfig) -> Self {
        debug!(
            bus = %config.name,
            max_middleware = config.max_middleware,
            max_listeners = config.max_listeners,
            "event bus created"
        );
        Self {
            name: config.name.clone(),
            middleware: MiddlewareRegistry::new(config.max_middleware),
            listeners: ListenerTable::new(config.max_listeners),
        }
    }

    /// Name of this bus.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------------
    // Middleware
    // ------------------------------------------------------------------

    /// Appends a middleware to the end of the chain.
    ///
    /// Keep a clone of the handle if you want to
    /// [`remove_middleware`](Self::remove_middleware) it later.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::CapacityExceeded`](crate::BusError::CapacityExceeded)
    /// when the chain already holds `max_middleware` entries. The chain is
    /// left unchanged.
    pub fn use_middleware(&self, middleware: BoxedMiddleware<E>) -> BusResult<()> {
        self.middleware.push(middleware)
    }

    /// Removes the first registration of `middleware`.
    ///
    /// Matching is by handle identity. Returns `false` if it was not
    /// registered.
    pub fn remove_middleware(&self, middleware: &BoxedMiddleware<E>) -> bool {
        self.middleware.remove(middleware)
    }

    /// Removes all middleware.
    pub fn clear_middleware(&self) {
        let removed = self.middleware.clear();
        debug!(bus = %self.name, removed, "middleware chain cleared");
    }

    /// Names of the registered middleware, in execution order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.names()
    }

    /// Current usage of the bus.
    #[must_use]
    pub fn diagnostics(&self) -> BusDiagnostics {
        BusDiagnostics {
            bus_id: self.name.clone(),
            middleware_count: self.middleware.len(),
            max_middleware: self.middleware.capacity(),
            middleware_utilization: self.middleware.utilization(),
            listener_counts: self.listeners.counts(),
            max_listeners: self.listeners.max_listeners(),
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Registers a listener for `event_name`.
    pub fn on<F>(&self, event_name: &str, listener: F) -> ListenerId
    where
        F: Fn(&E, &EventMeta) + Send + Sync + 'static,
    {
        self.listeners.add(event_name, false, Arc::new(listener))
    }

    /// Registers a listener that is removed after its first delivery.
    pub fn once<F>(&self, event_name: &str, listener: F) -> ListenerId
    where
        F: Fn(&E, &EventMeta) + Send + Sync + 'static,
    {
        self.listeners.add(event_name, true, Arc::new(listener))
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Removes the listeners of one event name, or all listeners for `None`.
    ///
    /// Returns how many were removed.
    pub fn remove_all_listeners(&self, event_name: Option<&str>) -> usize {
        self.listeners.remove_all(event_name)
    }

    /// Number of listeners registered for `event_name`.
    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners.count(event_name)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Emits an event.
    ///
    /// The event runs through the middleware chain, then every listener for
    /// its name is called with the final event. If a middleware does not call
    /// `next`, listeners are skipped and the outcome is `halted`.
    ///
    /// The chain is snapshotted before it runs, so middleware registered or
    /// removed during dispatch only affect later emits.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a middleware. Listeners are not
    /// called in that case.
    pub async fn emit(&self, mut event: E) -> BusResult<EmitOutcome<E>> {
        let event_name = event.name();
        let mut ctx = EventContext::new(EventMeta::new(self.name.clone(), event_name));
        let chain = self.middleware.snapshot();

        if let Err(err) = Next::new(&chain).run(&mut ctx, &mut event).await {
            error!(
                bus = %self.name,
                event = event_name,
                correlation_id = %ctx.correlation_id(),
                error = %err,
                "middleware failed, event dropped"
            );
            return Err(err);
        }

        if !ctx.chain_completed() {
            debug!(
                bus = %self.name,
                event = event_name,
                correlation_id = %ctx.correlation_id(),
                "event halted by middleware"
            );
            return Ok(EmitOutcome {
                event,
                meta: ctx.into_meta(),
                listeners_notified: 0,
                halted: true,
            });
        }

        let meta = ctx.into_meta();
        let listeners = self.listeners.take_for_dispatch(event_name);
        for listener in &listeners {
            listener(&event, &meta);
        }

        Ok(EmitOutcome {
            event,
            meta,
            listeners_notified: listeners.len(),
            halted: false,
        })
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.name)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

/// Builder for [`EventBus`].
///
/// # Example
///
/// ```
/// use vigil_bus::{BusEvent, EventBus};
/// use vigil_bus::stages::LoggingMiddleware;
/// use std::sync::Arc;
///
/// struct Tick;
/// impl BusEvent for Tick {
///     fn name(&self) -> &'static str { "tick" }
/// }
///
/// let bus = EventBus::<Tick>::builder()
///     .name("scheduler")
///     .max_middleware(4)
///     .middleware(Arc::new(LoggingMiddleware::new()))
///     .build()
///     .unwrap();
///
/// assert_eq!(bus.diagnostics().middleware_utilization, 25);
/// ```
pub struct EventBusBuilder<E> {
    config: BusConfig,
    middleware: Vec<BoxedMiddleware<E>>,
}

impl<E: BusEvent> EventBusBuilder<E> {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
            middleware: Vec::new(),
        }
    }

    /// Replaces the whole configuration section.
    #[must_use]
    pub fn config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bus name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the middleware capacity.
    #[must_use]
    pub fn max_middleware(mut self, max: usize) -> Self {
        self.config.max_middleware = max;
        self
    }

    /// Sets the advisory listener limit.
    #[must_use]
    pub fn max_listeners(mut self, max: usize) -> Self {
        self.config.max_listeners = max;
        self
    }

    /// Queues a middleware to register at build time.
    #[must_use]
    pub fn middleware(mut self, middleware: BoxedMiddleware<E>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Builds the bus.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or more middleware were queued
    /// than `max_middleware` allows.
    pub fn build(self) -> BusResult<EventBus<E>> {
        let bus = EventBus::with_config(&self.config)?;
        for middleware in self.middleware {
            bus.use_middleware(middleware)?;
        }
        Ok(bus)
    }
}

impl<E: BusEvent> Default for EventBusBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use crate::middleware::from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum SiteEvent {
        Added(String),
        Removed(String),
    }

    impl BusEvent for SiteEvent {
        fn name(&self) -> &'static str {
            match self {
                Self::Added(_) => "site:added",
                Self::Removed(_) => "site:removed",
            }
        }
    }

    fn pass(name: &'static str) -> BoxedMiddleware<SiteEvent> {
        from_fn(name, |ctx, event, next| next.run(ctx, event))
    }

    #[test]
    fn test_new_bus_defaults() {
        let bus = EventBus::<SiteEvent>::new();
        let diagnostics = bus.diagnostics();
        assert_eq!(bus.name(), "vigil");
        assert_eq!(diagnostics.middleware_count, 0);
        assert_eq!(diagnostics.max_middleware, 20);
        assert_eq!(diagnostics.max_listeners, 100);
        assert_eq!(diagnostics.middleware_utilization, 0);
    }

    #[test]
    fn test_with_config_rejects_zero_capacity() {
        let config = BusConfig::default().with_max_middleware(0);
        let err = EventBus::<SiteEvent>::with_config(&config).unwrap_err();
        assert!(matches!(err, BusError::Config(_)));
    }

    #[test]
    fn test_builder_over_capacity_fails() {
        let err = EventBus::<SiteEvent>::builder()
            .max_middleware(1)
            .middleware(pass("a"))
            .middleware(pass("b"))
            .build()
            .unwrap_err();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_builder_registers_in_order() {
        let bus = EventBus::<SiteEvent>::builder()
            .name("sites")
            .middleware(pass("a"))
            .middleware(pass("b"))
            .build()
            .unwrap();
        assert_eq!(bus.name(), "sites");
        assert_eq!(bus.middleware_names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_emit_routes_by_name() {
        let bus = EventBus::<SiteEvent>::new();
        let added = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&added);
        bus.on("site:added", move |_event, _meta| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = bus.emit(SiteEvent::Added("a.com".into())).await.unwrap();
        assert_eq!(outcome.listeners_notified, 1);
        assert!(!outcome.halted);
        assert_eq!(outcome.meta.event_name, "site:added");

        let outcome = bus.emit(SiteEvent::Removed("a.com".into())).await.unwrap();
        assert_eq!(outcome.listeners_notified, 0);
        assert_eq!(added.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listener_sees_meta() {
        let bus = EventBus::<SiteEvent>::builder().name("meta-bus").build().unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let slot = Arc::clone(&seen);
        bus.on("site:removed", move |_event, meta| {
            *slot.lock() = Some(meta.correlation_id);
        });

        let outcome = bus.emit(SiteEvent::Removed("b.com".into())).await.unwrap();
        assert_eq!(*seen.lock(), Some(outcome.meta.correlation_id));
        assert_eq!(outcome.meta.bus_id, "meta-bus");
    }

    #[tokio::test]
    async fn test_halted_emit_skips_listeners() {
        let bus = EventBus::<SiteEvent>::new();
        bus.on("site:added", |_event, _meta| panic!("listener must not run"));
        bus.use_middleware(from_fn("halt", |_ctx, _event, _next| {
            Box::pin(async { Ok(()) })
        }))
        .unwrap();

        let outcome = bus.emit(SiteEvent::Added("a.com".into())).await.unwrap();
        assert!(outcome.halted);
        assert_eq!(outcome.listeners_notified, 0);
    }

    #[test]
    fn test_debug_output() {
        let bus = EventBus::<SiteEvent>::new();
        bus.use_middleware(pass("logging")).unwrap();
        let debug = format!("{bus:?}");
        assert!(debug.contains("vigil"));
        assert!(debug.contains("logging"));
    }
}
