//! Bounded middleware registry.
//!
//! Holds the ordered middleware of one bus with a hard capacity. A chain
//! that grows every time a caller registers middleware and forgets to
//! remove it slows every dispatch; the ceiling turns that into an
//! immediate [`BusError::CapacityExceeded`] at the offending call.
//!
//! The registry is either *has room* (`len < capacity`, additions succeed)
//! or *full* (`len == capacity`, additions fail). Removal and clearing move
//! it back to *has room*.

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::diagnostics::utilization_percent;
use crate::error::{BusError, BusResult};
use crate::event::BusEvent;
use crate::middleware::{same_middleware, BoxedMiddleware};

/// Ordered, capacity-bounded middleware storage.
///
/// All mutation happens under one write lock, so the capacity check and the
/// append cannot interleave with another thread's.
pub struct MiddlewareRegistry<E> {
    entries: RwLock<Vec<BoxedMiddleware<E>>>,
    capacity: usize,
}

impl<E: BusEvent> MiddlewareRegistry<E> {
    /// Creates an empty registry.
    ///
    /// `capacity` is expected to be at least 1; the bus validates this
    /// before constructing a registry.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Appends `middleware`, or fails if the registry is full.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::CapacityExceeded`] carrying the capacity when the
    /// registry already holds `capacity` entries. Nothing is modified.
    pub fn push(&self, middleware: BoxedMiddleware<E>) -> BusResult<()> {
        let mut entries = self.entries.write();

        if entries.len() >= self.capacity {
            warn!(
                middleware = middleware.name(),
                middleware_count = entries.len(),
                max_middleware = self.capacity,
                "middleware limit reached, registration rejected"
            );
            return Err(BusError::capacity_exceeded(self.capacity));
        }

        debug!(
            middleware = middleware.name(),
            middleware_count = entries.len() + 1,
            max_middleware = self.capacity,
            "middleware registered"
        );
        entries.push(middleware);
        Ok(())
    }

    /// Removes the first entry that is the same allocation as `middleware`.
    ///
    /// Returns `false` (and does nothing) if it is not registered.
    pub fn remove(&self, middleware: &BoxedMiddleware<E>) -> bool {
        let mut entries = self.entries.write();

        match entries.iter().position(|m| same_middleware(m, middleware)) {
            Some(index) => {
                let removed = entries.remove(index);
                debug!(
                    middleware = removed.name(),
                    middleware_count = entries.len(),
                    "middleware removed"
                );
                true
            }
            None => false,
        }
    }

    /// Removes every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let removed = std::mem::take(&mut *self.entries.write()).len();
        debug!(removed, "middleware cleared");
        removed
    }

    /// Returns a copy of the current chain for dispatch.
    pub fn snapshot(&self) -> Vec<BoxedMiddleware<E>> {
        self.entries.read().clone()
    }

    /// Names of the registered middleware, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.read().iter().map(|m| m.name()).collect()
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no middleware is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether another registration would fail.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Current utilization as a rounded integer percentage.
    pub fn utilization(&self) -> u8 {
        utilization_percent(self.len(), self.capacity)
    }
}

impl<E: BusEvent> std::fmt::Debug for MiddlewareRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("middleware", &self.names())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EventContext;
    use crate::middleware::{BoxFuture, Middleware, Next};
    use std::sync::Arc;

    struct Noop;

    impl BusEvent for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }
    }

    struct Pass(&'static str);

    impl Middleware<Noop> for Pass {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut EventContext,
            event: &'a mut Noop,
            next: Next<'a, Noop>,
        ) -> BoxFuture<'a, BusResult<()>> {
            next.run(ctx, event)
        }
    }

    fn pass(name: &'static str) -> BoxedMiddleware<Noop> {
        Arc::new(Pass(name))
    }

    #[test]
    fn test_push_until_full() {
        let registry = MiddlewareRegistry::new(2);
        registry.push(pass("a")).unwrap();
        assert!(!registry.is_full());
        registry.push(pass("b")).unwrap();
        assert!(registry.is_full());

        let err = registry.push(pass("c")).unwrap_err();
        assert!(matches!(err, BusError::CapacityExceeded { max: 2 }));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_first_occurrence_only() {
        let registry = MiddlewareRegistry::new(3);
        let a = pass("a");
        registry.push(Arc::clone(&a)).unwrap();
        registry.push(pass("b")).unwrap();
        registry.push(Arc::clone(&a)).unwrap();

        assert!(registry.remove(&a));
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = MiddlewareRegistry::new(1);
        registry.push(pass("a")).unwrap();
        assert!(!registry.remove(&pass("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear() {
        let registry = MiddlewareRegistry::new(2);
        registry.push(pass("a")).unwrap();
        registry.push(pass("b")).unwrap();

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.utilization(), 0);
        assert_eq!(registry.clear(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = MiddlewareRegistry::new(2);
        registry.push(pass("a")).unwrap();
        let snapshot = registry.snapshot();
        registry.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_debug_lists_names() {
        let registry = MiddlewareRegistry::new(4);
        registry.push(pass("logging")).unwrap();
        let debug = format!("{registry:?}");
        assert!(debug.contains("logging"));
        assert!(debug.contains("capacity: 4"));
    }
}
