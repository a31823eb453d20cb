//! Event logging middleware.
//!
//! Logs each event as it enters the chain and again when the rest of the
//! chain returns, with the outcome and how long it took:
//!
//! - `debug` on entry
//! - `info` (or `debug` when quiet) on completion
//! - `warn` when the rest of the chain halted the event
//! - `error` is left to the bus, which logs middleware failures itself

use tracing::{debug, info, warn};

use crate::context::EventContext;
use crate::error::BusResult;
use crate::event::BusEvent;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Logs every event that passes through the bus.
///
/// Register it first so its timing covers the whole chain.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    quiet: bool,
}

impl LoggingMiddleware {
    /// Creates a logging middleware that reports completions at `info`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports completions at `debug` instead of `info`.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl<E: BusEvent> Middleware<E> for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>> {
        Box::pin(async move {
            let bus = ctx.meta().bus_id.clone();
            let event_name = ctx.event_name();
            let correlation_id = ctx.correlation_id();
            debug!(bus = %bus, event = event_name, %correlation_id, "event received");

            let result = next.run(ctx, event).await;
            if result.is_err() {
                return result;
            }

            let duration_ms = ctx.elapsed().as_secs_f64() * 1000.0;
            if !ctx.chain_completed() {
                warn!(
                    bus = %bus,
                    event = event_name,
                    %correlation_id,
                    duration_ms,
                    "event halted before listeners"
                );
            } else if self.quiet {
                debug!(bus = %bus, event = event_name, %correlation_id, duration_ms, "event dispatched");
            } else {
                info!(bus = %bus, event = event_name, %correlation_id, duration_ms, "event dispatched");
            }
            result
        })
    }
}
