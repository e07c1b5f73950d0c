use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Pseudo-identifier that accumulates errors from unmatched requests.
pub const NO_ROUTE_ID: &str = "no-route";

/// A consistent deep copy of all counters at one point in time.
///
/// Readers own the snapshot outright; mutating it has no effect on the
/// registry, and counters recorded after the snapshot was taken are not
/// reflected in it.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests successfully dispatched, per route identifier.
    pub request_count: HashMap<String, u64>,

    /// Errors, per route identifier plus the `no-route` pseudo-identifier.
    pub error_count: HashMap<String, u64>,

    /// Accumulated response time in nanoseconds, per route identifier.
    /// Consumers divide by `request_count` to obtain averages.
    pub response_times: HashMap<String, u64>,
}

#[derive(Default)]
struct Counters {
    request_count: HashMap<String, u64>,
    error_count: HashMap<String, u64>,
    response_time_ns: HashMap<String, u64>,
}

/// Per-route request, error, and latency counters.
///
/// Counters are monotonic for the process lifetime; no reset is exposed,
/// and removing a route does not clear its history. All three maps live
/// behind a single lock so a snapshot is a consistent cut: a reader never
/// observes a request counted in one map but not the other.
///
/// The registry has its own lock, independent of the route table, so metric
/// updates never contend with routing decisions.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use infra_gate::services::metrics::{MetricsRegistry, NO_ROUTE_ID};
///
/// let metrics = MetricsRegistry::new();
/// metrics.record_request("api", Duration::from_millis(3));
/// metrics.record_error(NO_ROUTE_ID);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.request_count.get("api"), Some(&1));
/// assert_eq!(snapshot.error_count.get(NO_ROUTE_ID), Some(&1));
/// ```
#[derive(Default)]
pub struct MetricsRegistry {
    counters: RwLock<Counters>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successfully dispatched request and its response time.
    pub fn record_request(&self, id: &str, elapsed: Duration) {
        let mut counters = self.counters.write().unwrap();
        *counters.request_count.entry(id.to_string()).or_insert(0) += 1;
        *counters.response_time_ns.entry(id.to_string()).or_insert(0) +=
            elapsed.as_nanos() as u64;
    }

    /// Records one error under the given identifier.
    ///
    /// Unmatched requests are recorded under [`NO_ROUTE_ID`].
    pub fn record_error(&self, id: &str) {
        let mut counters = self.counters.write().unwrap();
        *counters.error_count.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Returns a deep copy of all three counter maps.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.counters.read().unwrap();
        MetricsSnapshot {
            request_count: counters.request_count.clone(),
            error_count: counters.error_count.clone(),
            response_times: counters.response_time_ns.clone(),
        }
    }
}
