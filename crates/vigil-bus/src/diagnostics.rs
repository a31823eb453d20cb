//! Bus diagnostics.

use std::collections::BTreeMap;

use serde::Serialize;

/// Point-in-time view of a bus, for health endpoints and logs.
///
/// Utilization above ~80% is a good signal that middleware is being
/// registered without being removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDiagnostics {
    /// Name of the bus.
    pub bus_id: String,
    /// Registered middleware.
    pub middleware_count: usize,
    /// Configured middleware capacity.
    pub max_middleware: usize,
    /// `round(middleware_count / max_middleware * 100)`.
    pub middleware_utilization: u8,
    /// Listener count per event name, for names with at least one listener.
    pub listener_counts: BTreeMap<String, usize>,
    /// Advisory per-event listener limit.
    pub max_listeners: usize,
}

impl BusDiagnostics {
    /// Total listeners across every event name.
    pub fn total_listeners(&self) -> usize {
        self.listener_counts.values().sum()
    }

    /// Renders the diagnostics as JSON.
    ///
    /// Keys are camelCase, matching the `Serialize` impl.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Integer percentage of `count` over `capacity`, rounded half up.
///
/// A zero capacity reports 0. Computed in `u128` so any `usize` capacity
/// is accepted.
pub(crate) fn utilization_percent(count: usize, capacity: usize) -> u8 {
    if capacity == 0 {
        return 0;
    }
    let (count, capacity) = (count as u128, capacity as u128);
    let percent = (count * 200 + capacity) / (capacity * 2);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization_quarters() {
        assert_eq!(utilization_percent(0, 4), 0);
        assert_eq!(utilization_percent(1, 4), 25);
        assert_eq!(utilization_percent(2, 4), 50);
        assert_eq!(utilization_percent(4, 4), 100);
    }

    #[test]
    fn test_utilization_rounds_to_nearest() {
        assert_eq!(utilization_percent(1, 3), 33);
        assert_eq!(utilization_percent(2, 3), 67);
        assert_eq!(utilization_percent(1, 8), 13);
        assert_eq!(utilization_percent(1, 200), 1);
        assert_eq!(utilization_percent(1, 201), 0);
    }

    #[test]
    fn test_zero_capacity() {
        assert_eq!(utilization_percent(0, 0), 0);
    }

    #[test]
    fn test_utilization_with_huge_capacity() {
        assert_eq!(utilization_percent(0, usize::MAX), 0);
        assert_eq!(utilization_percent(20, usize::MAX), 0);
        assert_eq!(utilization_percent(usize::MAX / 2, usize::MAX), 50);
        assert_eq!(utilization_percent(usize::MAX, usize::MAX), 100);
    }

    #[test]
    fn test_json_shape() {
        let mut listener_counts = BTreeMap::new();
        listener_counts.insert("site:added".to_string(), 2);
        let diagnostics = BusDiagnostics {
            bus_id: "monitor".to_string(),
            middleware_count: 1,
            max_middleware: 4,
            middleware_utilization: 25,
            listener_counts,
            max_listeners: 100,
        };

        let json = diagnostics.to_json();
        assert_eq!(json["busId"], "monitor");
        assert_eq!(json["middlewareUtilization"], 25);
        assert_eq!(json["listenerCounts"]["site:added"], 2);
        assert!(json.get("middleware_count").is_none());
        assert_eq!(serde_json::to_value(&diagnostics).unwrap(), json);
        assert_eq!(diagnostics.total_listeners(), 2);
    }
}
