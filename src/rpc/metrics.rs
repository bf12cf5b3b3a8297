//! Lightweight counters tracking per-attempt outcomes and latency so the client
//! can expose aggregated snapshots without leaking implementation details.

use crate::rpc::error::{AttemptError, FailureKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct RpcMetrics {
    total_attempts: AtomicU64,
    total_failures: AtomicU64,
    total_timeouts: AtomicU64,
    total_protocol_errors: AtomicU64,
    total_exhausted: AtomicU64,
    total_latency_ns: AtomicU64,
}

impl RpcMetrics {
    pub(crate) fn record_success(&self, latency: Duration) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        self.add_latency(latency);
    }

    pub(crate) fn record_failure(&self, latency: Duration, err: &AttemptError) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        self.add_latency(latency);

        if err.is_timeout() {
            self.total_timeouts.fetch_add(1, Ordering::Relaxed);
        }
        if err.kind() == FailureKind::Protocol {
            self.total_protocol_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_exhausted(&self) {
        self.total_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    fn add_latency(&self, latency: Duration) {
        let nanos = latency.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, sticky_index: usize) -> RpcMetricsSnapshot {
        let total_attempts = self.total_attempts.load(Ordering::Relaxed);
        let total_failures = self.total_failures.load(Ordering::Relaxed);
        let total_latency_ns = self.total_latency_ns.load(Ordering::Relaxed);

        let average_latency_ms = if total_attempts == 0 {
            0.0
        } else {
            (total_latency_ns as f64 / total_attempts as f64) / 1_000_000.0
        };

        let failure_rate = if total_attempts == 0 {
            0.0
        } else {
            total_failures as f64 / total_attempts as f64
        };

        RpcMetricsSnapshot {
            total_attempts,
            total_failures,
            total_timeouts: self.total_timeouts.load(Ordering::Relaxed),
            total_protocol_errors: self.total_protocol_errors.load(Ordering::Relaxed),
            total_exhausted: self.total_exhausted.load(Ordering::Relaxed),
            average_latency_ms,
            failure_rate,
            sticky_index,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct RpcMetricsSnapshot {
    pub total_attempts: u64,
    pub total_failures: u64,
    pub total_timeouts: u64,
    pub total_protocol_errors: u64,
    pub total_exhausted: u64,
    pub average_latency_ms: f64,
    pub failure_rate: f64,
    pub sticky_index: usize,
}
