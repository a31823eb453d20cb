//! Event metrics middleware.
//!
//! Records through the `metrics` facade, so nothing is exported unless the
//! application installs a recorder.
//!
//! # Metrics Emitted
//!
//! - `vigil_bus_events_total{bus, event, outcome}` - Counter of events by
//!   outcome (`delivered`, `halted`, `failed`)
//! - `vigil_bus_dispatch_duration_seconds{bus, event}` - Histogram of the time
//!   spent in the rest of the chain

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};

use crate::context::EventContext;
use crate::error::BusResult;
use crate::event::BusEvent;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Name of the event counter.
pub const EVENTS_TOTAL: &str = "vigil_bus_events_total";

/// Name of the dispatch duration histogram.
pub const DISPATCH_DURATION_SECONDS: &str = "vigil_bus_dispatch_duration_seconds";

/// Registers descriptions for the bus metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(EVENTS_TOTAL, "Total events dispatched by outcome");
    describe_histogram!(
        DISPATCH_DURATION_SECONDS,
        "Time spent in the middleware chain, in seconds"
    );
}

/// How an event left the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every middleware passed it on.
    Delivered,
    /// A middleware stopped it without error.
    Halted,
    /// A middleware returned an error.
    Failed,
}

impl Outcome {
    /// Label value used on the counter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Halted => "halted",
            Self::Failed => "failed",
        }
    }
}

/// Records one dispatched event.
pub fn record_event(bus: &str, event: &'static str, outcome: Outcome, duration: Duration) {
    counter!(
        EVENTS_TOTAL,
        "bus" => bus.to_string(),
        "event" => event,
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        DISPATCH_DURATION_SECONDS,
        "bus" => bus.to_string(),
        "event" => event
    )
    .record(duration.as_secs_f64());
}

/// Counts events and times the chain that follows it.
#[derive(Debug, Clone, Default)]
pub struct MetricsMiddleware {
    _private: (),
}

impl MetricsMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: BusEvent> Middleware<E> for MetricsMiddleware {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>> {
        Box::pin(async move {
            let result = next.run(ctx, event).await;

            let outcome = match (&result, ctx.chain_completed()) {
                (Err(_), _) => Outcome::Failed,
                (Ok(()), true) => Outcome::Delivered,
                (Ok(()), false) => Outcome::Halted,
            };
            record_event(&ctx.meta().bus_id, ctx.event_name(), outcome, ctx.elapsed());
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use crate::event::EventMeta;
    use crate::middleware::{from_fn, BoxedMiddleware};
    use std::sync::Arc;

    struct Beat;

    impl BusEvent for Beat {
        fn name(&self) -> &'static str {
            "beat"
        }
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Delivered.as_str(), "delivered");
        assert_eq!(Outcome::Halted.as_str(), "halted");
        assert_eq!(Outcome::Failed.as_str(), "failed");
    }

    #[test]
    fn test_record_without_recorder() {
        describe_metrics();
        record_event("test", "beat", Outcome::Delivered, Duration::from_millis(3));
    }

    #[tokio::test]
    async fn test_error_is_returned_unchanged() {
        let fail: BoxedMiddleware<Beat> = from_fn("fail", |_ctx, _event, _next| {
            Box::pin(async { Err(BusError::rejected("fail", "boom")) })
        });
        let chain: Vec<BoxedMiddleware<Beat>> = vec![Arc::new(MetricsMiddleware::new()), fail];
        let mut ctx = EventContext::new(EventMeta::new("test", "beat"));

        let err = Next::new(&chain).run(&mut ctx, &mut Beat).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_passes_event_through() {
        let chain: Vec<BoxedMiddleware<Beat>> = vec![Arc::new(MetricsMiddleware::new())];
        let mut ctx = EventContext::new(EventMeta::new("test", "beat"));

        Next::new(&chain).run(&mut ctx, &mut Beat).await.unwrap();
        assert!(ctx.chain_completed());
    }
}
