//! Middleware composition.
//!
//! A composed middleware runs its inner middleware in order and then
//! continues with the rest of the bus chain, while occupying one registry
//! slot. This is the usual fix for a bus that hits its middleware limit.

use crate::context::EventContext;
use crate::error::BusResult;
use crate::event::BusEvent;
use crate::middleware::{BoxFuture, BoxedMiddleware, Middleware, Next};
use std::sync::Arc;

/// Several middleware behaving as one.
pub struct ComposedMiddleware<E> {
    name: &'static str,
    inner: Vec<BoxedMiddleware<E>>,
}

impl<E: BusEvent> ComposedMiddleware<E> {
    /// Creates a composition. `inner` runs in the order given.
    pub fn new(name: &'static str, inner: Vec<BoxedMiddleware<E>>) -> Self {
        Self { name, inner }
    }

    /// Number of wrapped middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing is wrapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Names of the wrapped middleware.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.inner.iter().map(|m| m.name()).collect()
    }
}

impl<E: BusEvent> Middleware<E> for ComposedMiddleware<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>> {
        Next::nested(&self.inner, next).run(ctx, event)
    }
}

/// Combines `middleware` into a single handle.
///
/// ```
/// use vigil_bus::{BoxedMiddleware, BusEvent, EventBus};
/// use vigil_bus::stages::{compose, LoggingMiddleware, MetricsMiddleware};
/// use std::sync::Arc;
///
/// struct Tick;
/// impl BusEvent for Tick {
///     fn name(&self) -> &'static str { "tick" }
/// }
///
/// let bus = EventBus::<Tick>::builder().max_middleware(1).build().unwrap();
/// let logging: BoxedMiddleware<Tick> = Arc::new(LoggingMiddleware::new());
/// let metrics: BoxedMiddleware<Tick> = Arc::new(MetricsMiddleware::new());
///
/// let observability = compose("observability", vec![logging, metrics]);
/// bus.use_middleware(observability).unwrap();
/// assert_eq!(bus.diagnostics().middleware_utilization, 100);
/// ```
pub fn compose<E: BusEvent>(
    name: &'static str,
    middleware: Vec<BoxedMiddleware<E>>,
) -> BoxedMiddleware<E> {
    Arc::new(ComposedMiddleware::new(name, middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventMeta;
    use crate::middleware::from_fn;

    #[derive(Debug, Default)]
    struct Trail(Vec<&'static str>);

    impl BusEvent for Trail {
        fn name(&self) -> &'static str {
            "trail"
        }
    }

    fn mark(name: &'static str) -> BoxedMiddleware<Trail> {
        from_fn::<Trail, _>(name, |ctx, event, next| {
            Box::pin(async move {
                event.0.push(ctx.event_name());
                next.run(ctx, event).await
            })
        })
    }

    fn stamp(label: &'static str) -> BoxedMiddleware<Trail> {
        struct Stamp(&'static str);

        impl Middleware<Trail> for Stamp {
            fn name(&self) -> &'static str {
                self.0
            }

            fn process<'a>(
                &'a self,
                ctx: &'a mut EventContext,
                event: &'a mut Trail,
                next: Next<'a, Trail>,
            ) -> BoxFuture<'a, BusResult<()>> {
                Box::pin(async move {
                    event.0.push(self.0);
                    next.run(ctx, event).await
                })
            }
        }

        Arc::new(Stamp(label))
    }

    #[tokio::test]
    async fn test_inner_then_outer() {
        let composed = compose("group", vec![stamp("a"), stamp("b")]);
        let chain = vec![composed, stamp("c")];
        let mut ctx = EventContext::new(EventMeta::new("test", "trail"));
        let mut event = Trail::default();

        Next::new(&chain).run(&mut ctx, &mut event).await.unwrap();
        assert_eq!(event.0, vec!["a", "b", "c"]);
        assert!(ctx.chain_completed());
    }

    #[tokio::test]
    async fn test_nested_composition() {
        let inner = compose("inner", vec![stamp("b"), stamp("c")]);
        let outer = compose("outer", vec![stamp("a"), inner, stamp("d")]);
        let chain = vec![outer, stamp("e")];
        let mut ctx = EventContext::new(EventMeta::new("test", "trail"));
        let mut event = Trail::default();

        Next::new(&chain).run(&mut ctx, &mut event).await.unwrap();
        assert_eq!(event.0, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_empty_composition_passes_through() {
        let chain = vec![compose("empty", Vec::new()), mark("after")];
        let mut ctx = EventContext::new(EventMeta::new("test", "trail"));
        let mut event = Trail::default();

        Next::new(&chain).run(&mut ctx, &mut event).await.unwrap();
        assert_eq!(event.0, vec!["trail"]);
        assert!(ctx.chain_completed());
    }

    #[test]
    fn test_names() {
        let composed = ComposedMiddleware::new("group", vec![stamp("a"), stamp("b")]);
        assert_eq!(composed.len(), 2);
        assert!(!composed.is_empty());
        assert_eq!(composed.names(), vec!["a", "b"]);
        assert_eq!(Middleware::<Trail>::name(&composed), "group");
    }
}
