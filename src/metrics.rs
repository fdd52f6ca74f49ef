//! Request metrics.
//!
//! Counts requests and records their latency per method, route and status.
//! Values reset only on process start.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;

/// Upper bounds, in seconds, of the latency histogram buckets.
pub const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

type SeriesKey = (String, String, u16);

#[derive(Debug, Default)]
struct Series {
    count: u64,
    latency_sum: f64,
    buckets: [u64; LATENCY_BUCKETS.len()],
}

/// Registry of per-request series, shared between the middleware and the
/// `/metrics` route.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    series: Mutex<BTreeMap<SeriesKey, Series>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished request.
    pub fn record(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();
        let mut series = self.lock();
        let entry = series
            .entry((method.to_string(), path.to_string(), status))
            .or_default();
        entry.count += 1;
        entry.latency_sum += seconds;
        // Buckets are cumulative: a request lands in every bucket it fits under.
        for (bucket, bound) in entry.buckets.iter_mut().zip(LATENCY_BUCKETS) {
            if seconds <= bound {
                *bucket += 1;
            }
        }
    }

    /// Number of requests seen for a method, route and status.
    pub fn count(&self, method: &str, path: &str, status: u16) -> u64 {
        self.lock()
            .get(&(method.to_string(), path.to_string(), status))
            .map_or(0, |s| s.count)
    }

    /// Point-in-time copy of every series, ordered by method, route, status.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self
            .lock()
            .iter()
            .map(|((method, path, status), s)| RequestStats {
                method: method.clone(),
                path: path.clone(),
                status: *status,
                count: s.count,
                latency_sum_seconds: s.latency_sum,
                latency_buckets: s.buckets.to_vec(),
            })
            .collect();

        MetricsSnapshot {
            latency_buckets_seconds: LATENCY_BUCKETS.to_vec(),
            requests,
        }
    }

    // A panic while holding the lock leaves the counters usable.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<SeriesKey, Series>> {
        self.series.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serialized body of the `/metrics` route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub latency_buckets_seconds: Vec<f64>,
    pub requests: Vec<RequestStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestStats {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub count: u64,
    pub latency_sum_seconds: f64,
    /// Cumulative counts, aligned with [`LATENCY_BUCKETS`].
    pub latency_buckets: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_series() {
        let metrics = RequestMetrics::new();
        metrics.record("GET", "/tables/{table}", 200, Duration::from_millis(3));
        metrics.record("GET", "/tables/{table}", 200, Duration::from_millis(30));
        metrics.record("GET", "/tables/{table}", 400, Duration::from_millis(1));

        assert_eq!(metrics.count("GET", "/tables/{table}", 200), 2);
        assert_eq!(metrics.count("GET", "/tables/{table}", 400), 1);
        assert_eq!(metrics.count("POST", "/tables/{table}", 200), 0);
    }

    #[test]
    fn test_latency_buckets_are_cumulative() {
        let metrics = RequestMetrics::new();
        metrics.record("DELETE", "/tables/{table}", 200, Duration::from_millis(30));

        let snapshot = metrics.snapshot();
        let stats = &snapshot.requests[0];
        // 30ms misses the 5ms, 10ms and 25ms buckets and fits every later one
        assert_eq!(stats.latency_buckets, vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert!((stats.latency_sum_seconds - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_serializes_in_order() {
        let metrics = RequestMetrics::new();
        metrics.record("POST", "/tables/{table}", 200, Duration::ZERO);
        metrics.record("GET", "/tables/{table}", 200, Duration::ZERO);

        let snapshot = metrics.snapshot();
        let methods: Vec<&str> = snapshot.requests.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST"]);

        let body = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(body["requests"][0]["count"], 1);
        assert_eq!(body["latency_buckets_seconds"].as_array().unwrap().len(), 11);
    }
}
