//! Event validation middleware.
//!
//! Rules are plain functions returning `Err(reason)` for an invalid event.
//! The first failing rule rejects the event with
//! [`BusError::Rejected`](crate::BusError::Rejected); listeners never see it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::context::EventContext;
use crate::error::{BusError, BusResult};
use crate::event::BusEvent;
use crate::middleware::{BoxFuture, Middleware, Next};

type Rule<E> = Arc<dyn Fn(&E) -> Result<(), String> + Send + Sync>;

/// Rejects events that fail registered rules.
///
/// # Example
///
/// ```
/// use vigil_bus::BusEvent;
/// use vigil_bus::stages::ValidationMiddleware;
///
/// enum SiteEvent {
///     Added { identifier: String },
/// }
///
/// impl BusEvent for SiteEvent {
///     fn name(&self) -> &'static str {
///         "site:added"
///     }
/// }
///
/// let validation = ValidationMiddleware::new().rule("site:added", |event: &SiteEvent| {
///     let SiteEvent::Added { identifier } = event;
///     if identifier.is_empty() {
///         return Err("identifier is empty".to_string());
///     }
///     Ok(())
/// });
/// assert_eq!(validation.rule_count(), 1);
/// ```
pub struct ValidationMiddleware<E> {
    rules: HashMap<&'static str, Vec<Rule<E>>>,
    global: Vec<Rule<E>>,
}

impl<E: BusEvent> ValidationMiddleware<E> {
    /// Creates a middleware with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            global: Vec::new(),
        }
    }

    /// Adds a rule for events named `event_name`.
    #[must_use]
    pub fn rule<F>(mut self, event_name: &'static str, rule: F) -> Self
    where
        F: Fn(&E) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.entry(event_name).or_default().push(Arc::new(rule));
        self
    }

    /// Adds a rule checked for every event, before per-name rules.
    #[must_use]
    pub fn global_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&E) -> Result<(), String> + Send + Sync + 'static,
    {
        self.global.push(Arc::new(rule));
        self
    }

    /// Total number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.global.len() + self.rules.values().map(Vec::len).sum::<usize>()
    }

    /// Runs the rules that apply to `event`.
    ///
    /// # Errors
    ///
    /// Returns the reason given by the first failing rule.
    pub fn check(&self, event_name: &str, event: &E) -> Result<(), String> {
        let scoped = self.rules.get(event_name).into_iter().flatten();
        self.global.iter().chain(scoped).try_for_each(|rule| rule(event))
    }
}

impl<E: BusEvent> Default for ValidationMiddleware<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for ValidationMiddleware<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationMiddleware")
            .field("events", &self.rules.keys().collect::<Vec<_>>())
            .field("global_rules", &self.global.len())
            .finish()
    }
}

impl<E: BusEvent> Middleware<E> for ValidationMiddleware<E> {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut EventContext,
        event: &'a mut E,
        next: Next<'a, E>,
    ) -> BoxFuture<'a, BusResult<()>> {
        match self.check(ctx.event_name(), event) {
            Ok(()) => next.run(ctx, event),
            Err(reason) => {
                warn!(
                    bus = %ctx.meta().bus_id,
                    event = ctx.event_name(),
                    correlation_id = %ctx.correlation_id(),
                    reason = %reason,
                    "event failed validation"
                );
                Box::pin(async move { Err(BusError::rejected("validation", reason)) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum SiteEvent {
        Added { identifier: String },
        Removed { identifier: String },
    }

    impl BusEvent for SiteEvent {
        fn name(&self) -> &'static str {
            match self {
                Self::Added { .. } => "site:added",
                Self::Removed { .. } => "site:removed",
            }
        }
    }

    fn identifier(event: &SiteEvent) -> &str {
        match event {
            SiteEvent::Added { identifier } | SiteEvent::Removed { identifier } => identifier,
        }
    }

    fn validation() -> ValidationMiddleware<SiteEvent> {
        ValidationMiddleware::new()
            .global_rule(|event| {
                if identifier(event).is_empty() {
                    Err("identifier is empty".to_string())
                } else {
                    Ok(())
                }
            })
            .rule("site:added", |event| {
                if identifier(event).contains(' ') {
                    Err("identifier contains whitespace".to_string())
                } else {
                    Ok(())
                }
            })
    }

    #[test]
    fn test_valid_event_passes() {
        let v = validation();
        let event = SiteEvent::Added {
            identifier: "example.com".into(),
        };
        assert!(v.check(event.name(), &event).is_ok());
    }

    #[test]
    fn test_global_rule_runs_first() {
        let v = validation();
        let event = SiteEvent::Added {
            identifier: String::new(),
        };
        assert_eq!(v.check(event.name(), &event).unwrap_err(), "identifier is empty");
    }

    #[test]
    fn test_rules_are_scoped_by_name() {
        let v = validation();
        let added = SiteEvent::Added {
            identifier: "a b".into(),
        };
        let removed = SiteEvent::Removed {
            identifier: "a b".into(),
        };
        assert!(v.check(added.name(), &added).is_err());
        assert!(v.check(removed.name(), &removed).is_ok());
        assert_eq!(v.rule_count(), 2);
    }

    #[test]
    fn test_debug_hides_closures() {
        let debug = format!("{:?}", validation());
        assert!(debug.contains("site:added"));
        assert!(debug.contains("global_rules: 1"));
    }
}
