//! Core middleware trait and chain types.
//!
//! Middleware sees every event before listeners do. Each one receives the
//! mutable [`EventContext`], the event itself, and a [`Next`] that continues
//! the chain.
//!
//! # Chain contract
//!
//! - Middleware run in the order they were registered.
//! - Calling `next.run(ctx, event)` passes the event on. Not calling it
//!   short-circuits: remaining middleware and all listeners are skipped and
//!   the emit reports `halted`.
//! - Returning `Err` stops the chain; the error is returned from `emit`.
//! - Middleware may mutate the event; listeners see the final value.
//!
//! # Example
//!
//! ```
//! use vigil_bus::{BoxFuture, BusEvent, BusResult, EventContext, Middleware, Next};
//!
//! struct Audit;
//!
//! impl<E: BusEvent> Middleware<E> for Audit {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut EventContext,
//!         event: &'a mut E,
//!         next: Next<'a, E>,
//!     ) -> BoxFuture<'a, BusResult<()>> {
//!         Box::pin(async move {
//!             tracing::debug!(event = ctx.event_name(), "audit");
//!             next.run(ctx, event).await
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::EventContext;
use crate::error::BusResult;
use crate::event::BusEvent;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased, shareable middleware handle.
///
/// Registry identity is the `Arc` allocation: keep a clone of the handle you
/// registered to remove it later.
pub type BoxedMiddleware<E> = Arc<dyn Middleware<E>>;

/// The middleware trait.
pub trait Middleware<E>: Send + Sync + 'static {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Process one event.
    ///
    /// Call `next.run(ctx, event).await` to continue the chain.
    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>>;
}

/// The remainder of a middleware chain.
///
/// Consumed by [`run`](Next::run), so it can be invoked at most once.
pub struct Next<'a, E> {
    remaining: &'a [BoxedMiddleware<E>],
    then: Option<Box<Next<'a, E>>>,
}

impl<'a, E: BusEvent> Next<'a, E> {
    /// Creates a chain over `middleware`, ending at listener delivery.
    pub(crate) fn new(middleware: &'a [BoxedMiddleware<E>]) -> Self {
        Self {
            remaining: middleware,
            then: None,
        }
    }

    /// Creates a chain over `middleware` that continues with `then`.
    pub(crate) fn nested(middleware: &'a [BoxedMiddleware<E>], then: Next<'a, E>) -> Self {
        Self {
            remaining: middleware,
            then: Some(Box::new(then)),
        }
    }

    /// Number of middleware left before listeners are reached.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len() + self.then.as_ref().map_or(0, |then| then.remaining())
    }

    /// Invokes the next middleware, or marks the chain complete if none is left.
    pub fn run<'b>(
        self,
        ctx: &'b mut EventContext,
        event: &'b mut E,
    ) -> BoxFuture<'b, BusResult<()>>
    where
        'a: 'b,
    {
        match self.remaining.split_first() {
            Some((middleware, rest)) => middleware.process(
                ctx,
                event,
                Next {
                    remaining: rest,
                    then: self.then,
                },
            ),
            None => match self.then {
                Some(then) => (*then).run(ctx, event),
                None => Box::pin(async move {
                    ctx.mark_chain_completed();
                    Ok(())
                }),
            },
        }
    }
}

/// Middleware built from a closure.
///
/// Usually created through [`from_fn`].
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<E, F> Middleware<E> for FnMiddleware<F>
where
    E: BusEvent,
    F: for<'a> Fn(&'a mut EventContext, &'a mut E, Next<'a, E>) -> BoxFuture<'a, BusResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>> {
        (self.func)(ctx, event, next)
    }
}

/// Wraps a closure as a [`BoxedMiddleware`].
///
/// ```ignore
/// let timing = from_fn("timing", |ctx, event, next| {
///     Box::pin(async move {
///         let result = next.run(ctx, event).await;
///         tracing::debug!(elapsed = ?ctx.elapsed(), "dispatched");
///         result
///     })
/// });
/// bus.use_middleware(timing.clone())?;
/// ```
pub fn from_fn<E, F>(name: &'static str, func: F) -> BoxedMiddleware<E>
where
    E: BusEvent,
    F: for<'a> Fn(&'a mut EventContext, &'a mut E, Next<'a, E>) -> BoxFuture<'a, BusResult<()>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnMiddleware::new(name, func))
}

/// Whether two handles refer to the same middleware allocation.
pub(crate) fn same_middleware<E>(a: &BoxedMiddleware<E>, b: &BoxedMiddleware<E>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use crate::event::EventMeta;

    #[derive(Debug, PartialEq)]
    struct Ping(Vec<&'static str>);

    impl BusEvent for Ping {
        fn name(&self) -> &'static str {
            "ping"
        }
    }

    struct Tag(&'static str);

    impl Middleware<Ping> for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut EventContext,
            event: &'a mut Ping,
            next: Next<'a, Ping>,
        ) -> BoxFuture<'a, BusResult<()>> {
            Box::pin(async move {
                event.0.push(self.0);
                next.run(ctx, event).await
            })
        }
    }

    fn tag(name: &'static str) -> BoxedMiddleware<Ping> {
        Arc::new(Tag(name))
    }

    fn ctx() -> EventContext {
        EventContext::new(EventMeta::new("test", "ping"))
    }

    #[tokio::test]
    async fn test_empty_chain_completes() {
        let chain: Vec<BoxedMiddleware<Ping>> = Vec::new();
        let mut ctx = ctx();
        let mut event = Ping(vec![]);

        Next::new(&chain).run(&mut ctx, &mut event).await.unwrap();
        assert!(ctx.chain_completed());
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let chain = vec![tag("first"), tag("second")];
        let mut ctx = ctx();
        let mut event = Ping(vec![]);

        let next = Next::new(&chain);
        assert_eq!(next.remaining(), 2);
        next.run(&mut ctx, &mut event).await.unwrap();

        assert_eq!(event.0, vec!["first", "second"]);
        assert!(ctx.chain_completed());
    }

    #[tokio::test]
    async fn test_nested_chain_continues_outer() {
        let inner = vec![tag("inner")];
        let outer = vec![tag("outer")];
        let mut ctx = ctx();
        let mut event = Ping(vec![]);

        let next = Next::nested(&inner, Next::new(&outer));
        assert_eq!(next.remaining(), 2);
        next.run(&mut ctx, &mut event).await.unwrap();

        assert_eq!(event.0, vec!["inner", "outer"]);
        assert!(ctx.chain_completed());
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuit() {
        let drop: BoxedMiddleware<Ping> =
            from_fn("drop", |_ctx, _event, _next| Box::pin(async { Ok(()) }));
        let chain = vec![drop, tag("unreached")];
        let mut ctx = ctx();
        let mut event = Ping(vec![]);

        Next::new(&chain).run(&mut ctx, &mut event).await.unwrap();
        assert!(event.0.is_empty());
        assert!(!ctx.chain_completed());
        assert_eq!(chain[0].name(), "drop");
    }

    #[tokio::test]
    async fn test_fn_middleware_error_stops_chain() {
        let deny: BoxedMiddleware<Ping> = from_fn("deny", |_ctx, _event, _next| {
            Box::pin(async { Err(BusError::rejected("deny", "no pings")) })
        });
        let chain = vec![deny, tag("unreached")];
        let mut ctx = ctx();
        let mut event = Ping(vec![]);

        let err = Next::new(&chain).run(&mut ctx, &mut event).await.unwrap_err();
        assert!(matches!(err, BusError::Rejected { .. }));
        assert!(event.0.is_empty());
    }

    #[test]
    fn test_same_middleware_is_identity() {
        let a = tag("a");
        let a2 = Arc::clone(&a);
        let b = tag("a");

        assert!(same_middleware(&a, &a2));
        assert!(!same_middleware(&a, &b));
    }
}
