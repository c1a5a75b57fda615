//! Telemetry Module for HolderGate
//!
//! Anonymous counters for operational diagnostics. Privacy-first: no
//! addresses or caller identities are stored.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::errors::ErrorCode;

/// Outcome of one verification request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Granted,
    Denied,
    Failed(ErrorCode),
}

/// Lock-free request counters
#[derive(Debug, Default)]
pub struct TelemetryCollector {
    total_requests: AtomicU64,
    granted: AtomicU64,
    denied: AtomicU64,
    invalid_requests: AtomicU64,
    throttled: AtomicU64,
    oracle_failures: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Snapshot of [`TelemetryCollector`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TelemetryStats {
    pub total_requests: u64,
    pub granted: u64,
    pub denied: u64,
    pub invalid_requests: u64,
    pub throttled: u64,
    pub oracle_failures: u64,
    pub avg_latency_ms: f64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request that reached the pipeline
    pub fn record(&self, outcome: RequestOutcome, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        let counter = match outcome {
            RequestOutcome::Granted => &self.granted,
            RequestOutcome::Denied => &self.denied,
            RequestOutcome::Failed(code) if code.is_oracle_failure() => &self.oracle_failures,
            RequestOutcome::Failed(ErrorCode::ThrottleExceeded) => &self.throttled,
            RequestOutcome::Failed(_) => &self.invalid_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request rejected by the throttle (never reaches the pipeline)
    pub fn record_throttled(&self) {
        self.record(RequestOutcome::Failed(ErrorCode::ThrottleExceeded), 0);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total = self.total_requests.load(Ordering::Relaxed);
        let latency = self.total_latency_ms.load(Ordering::Relaxed);
        TelemetryStats {
            total_requests: total,
            granted: self.granted.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            invalid_requests: self.invalid_requests.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
            avg_latency_ms: if total == 0 {
                0.0
            } else {
                latency as f64 / total as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_outcome() {
        let t = TelemetryCollector::new();
        t.record(RequestOutcome::Granted, 10);
        t.record(RequestOutcome::Denied, 20);
        t.record(RequestOutcome::Failed(ErrorCode::OracleUnavailable), 30);
        t.record(RequestOutcome::Failed(ErrorCode::OracleRejected), 0);
        t.record(RequestOutcome::Failed(ErrorCode::InvalidAddress), 0);
        t.record_throttled();

        let s = t.get_stats();
        assert_eq!(s.total_requests, 6);
        assert_eq!(s.granted, 1);
        assert_eq!(s.denied, 1);
        assert_eq!(s.oracle_failures, 2);
        assert_eq!(s.invalid_requests, 1);
        assert_eq!(s.throttled, 1);
        assert_eq!(s.avg_latency_ms, 10.0);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(TelemetryCollector::new().get_stats().avg_latency_ms, 0.0);
    }
}
