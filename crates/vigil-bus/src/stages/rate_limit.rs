//! Rate limiting middleware.
//!
//! Limits how many events of each name pass per time window. Events over
//! the limit are dropped: the chain halts, listeners are not called, and
//! `emit` reports `halted`.
//!
//! ## Algorithm
//!
//! Fixed window per event name. The first event of a name opens a window;
//! once `window` has elapsed the next event opens a fresh one.
//!
//! ## Example
//!
//! ```
//! use vigil_bus::stages::RateLimitMiddleware;
//! use std::time::Duration;
//!
//! let rate_limit = RateLimitMiddleware::builder()
//!     .limit(10)
//!     .window(Duration::from_secs(1))
//!     .build();
//! assert_eq!(rate_limit.dropped(), 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::warn;

use crate::context::EventContext;
use crate::error::BusResult;
use crate::event::BusEvent;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Drops events that exceed a per-name rate.
#[derive(Debug)]
pub struct RateLimitMiddleware {
    limit: u64,
    window: Duration,
    windows: Mutex<HashMap<&'static str, WindowData>>,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
struct WindowData {
    count: u64,
    started: Instant,
}

impl RateLimitMiddleware {
    /// Creates a limiter allowing `limit` events of each name per `window`.
    #[must_use]
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> RateLimitBuilder {
        RateLimitBuilder::default()
    }

    /// Events dropped since creation.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Events of `event_name` still allowed in the current window.
    #[must_use]
    pub fn remaining(&self, event_name: &str) -> u64 {
        let windows = self.windows.lock();
        match windows.get(event_name) {
            Some(data) if data.started.elapsed() < self.window => {
                self.limit.saturating_sub(data.count)
            }
            _ => self.limit,
        }
    }

    /// Counts one event and reports whether it is within the limit.
    fn admit(&self, event_name: &'static str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock();
        let data = windows.entry(event_name).or_insert(WindowData {
            count: 0,
            started: now,
        });

        if now.duration_since(data.started) >= self.window {
            data.count = 0;
            data.started = now;
        }

        if data.count >= self.limit {
            return false;
        }
        data.count += 1;
        true
    }
}

impl<E: BusEvent> Middleware<E> for RateLimitMiddleware {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>> {
        let event_name = ctx.event_name();
        if self.admit(event_name) {
            return next.run(ctx, event);
        }

        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
            bus = %ctx.meta().bus_id,
            event = event_name,
            correlation_id = %ctx.correlation_id(),
            limit = self.limit,
            window_ms = self.window.as_millis() as u64,
            dropped,
            "event rate limit exceeded, event dropped"
        );
        Box::pin(async { Ok(()) })
    }
}

/// Builder for [`RateLimitMiddleware`].
#[derive(Debug, Clone)]
pub struct RateLimitBuilder {
    limit: u64,
    window: Duration,
}

impl Default for RateLimitBuilder {
    fn default() -> Self {
        Self {
            limit: 100,
            window: Duration::from_secs(1),
        }
    }
}

impl RateLimitBuilder {
    /// Maximum events of one name per window.
    ///
    /// Default: 100.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Length of a window.
    ///
    /// Default: 1 second.
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Builds the middleware.
    #[must_use]
    pub fn build(self) -> RateLimitMiddleware {
        RateLimitMiddleware::new(self.limit, self.window)
    }
}
