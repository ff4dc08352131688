//! Per-client session state: call metrics and the backoff timer.

use crate::retry::BackoffState;
use std::collections::BTreeMap;
use std::time::Duration;

/// Call count and cumulative wall-clock time for one endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointMetrics {
    /// Number of logical calls.
    pub calls: u64,
    /// Time spent in those calls, retries and backoff included.
    pub elapsed: Duration,
}

/// Call metrics accumulated over a client session, keyed by endpoint
/// (`"METHOD /canonical/path"`).
///
/// # Examples
///
/// ```
/// use pdrest::session::SessionMetrics;
/// use std::time::Duration;
///
/// let mut metrics = SessionMetrics::default();
/// metrics.record("GET /users/{id}", Duration::from_millis(120));
/// metrics.record("GET /users/{id}", Duration::from_millis(80));
///
/// let user_gets = metrics.endpoint("GET /users/{id}").unwrap();
/// assert_eq!(user_gets.calls, 2);
/// assert_eq!(user_gets.elapsed, Duration::from_millis(200));
/// assert_eq!(metrics.total_calls(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    endpoints: BTreeMap<String, EndpointMetrics>,
    total_calls: u64,
    total_elapsed: Duration,
}

impl SessionMetrics {
    /// Records one logical call.
    pub fn record(&mut self, endpoint: &str, elapsed: Duration) {
        let entry = self.endpoints.entry(endpoint.to_string()).or_default();
        entry.calls += 1;
        entry.elapsed += elapsed;
        self.total_calls += 1;
        self.total_elapsed += elapsed;
    }

    /// Metrics for one endpoint.
    pub fn endpoint(&self, endpoint: &str) -> Option<EndpointMetrics> {
        self.endpoints.get(endpoint).copied()
    }

    /// All endpoints called so far, in key order.
    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &EndpointMetrics)> {
        self.endpoints.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total logical calls.
    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }

    /// Total time spent in calls.
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }
}

/// Mutable state owned by one client session.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    pub(crate) metrics: SessionMetrics,
    pub(crate) backoff: BackoffState,
}
