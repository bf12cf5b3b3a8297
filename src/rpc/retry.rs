//! Retry policy for walking the probe order, plus the logging context the
//! executor uses so every call reports attempts and exhaustion the same way.

use crate::rpc::error::AttemptError;
use std::time::Duration;
use tokio::task::yield_now;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// How many attempts a call may make and how long to pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: usize,
}

impl RetryPolicy {
    /// One attempt per endpoint.
    pub fn per_endpoint(endpoints: usize, delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: endpoints.max(1),
        }
    }

    /// Pause to apply after `attempt` (1-based) failed, or `None` when the
    /// call is exhausted and should stop.
    pub fn delay_after(&self, attempt: usize) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }
}

/// Per-call logging helper carrying the method name.
#[derive(Clone, Copy)]
pub(crate) struct CallContext<'a> {
    method: &'a str,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(method: &'a str) -> Self {
        Self { method }
    }

    pub(crate) fn log_probe_order(&self, order: &[(usize, &str)]) {
        if tracing::enabled!(tracing::Level::TRACE) {
            let order: Vec<usize> = order.iter().map(|(idx, _)| *idx).collect();
            tracing::trace!(method = self.method, ?order, "rpc probe order");
        }
    }

    pub(crate) fn log_success(&self, attempt: usize, id: u64, index: usize, endpoint: &str) {
        tracing::debug!(
            method = self.method,
            attempt,
            id,
            endpoint_index = index,
            endpoint,
            "rpc call succeeded"
        );
    }

    pub(crate) fn log_failure(&self, attempt: usize, id: u64, err: &AttemptError, delay: Option<Duration>) {
        let kind = err.kind();
        match delay {
            Some(delay) => tracing::warn!(
                method = self.method,
                attempt,
                id,
                endpoint = err.endpoint(),
                kind = ?kind,
                delay_ms = duration_to_millis(delay),
                error = %err,
                "rpc attempt failed; trying next endpoint"
            ),
            None => tracing::warn!(
                method = self.method,
                attempt,
                id,
                endpoint = err.endpoint(),
                kind = ?kind,
                error = %err,
                "rpc attempt failed on last endpoint"
            ),
        }
    }

    pub(crate) fn log_exhausted(&self, attempts: usize, last: Option<&AttemptError>) {
        match last {
            Some(err) => tracing::error!(
                method = self.method,
                attempts,
                error = %err,
                "rpc call exhausted all endpoints"
            ),
            None => tracing::error!(
                method = self.method,
                attempts,
                "rpc call exhausted all endpoints"
            ),
        }
    }

    pub(crate) fn log_cancelled(&self, attempt: usize) {
        tracing::debug!(method = self.method, attempt, "rpc call cancelled");
    }
}

/// Sleeps for `delay` unless `cancel` fires first. Returns `false` when the
/// pause was cut short by cancellation.
pub(crate) async fn sleep_with_cancellation(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        yield_now().await;
        return true;
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(delay) => true,
    }
}

fn duration_to_millis(delay: Duration) -> u64 {
    delay.as_millis().min(u128::from(u64::MAX)) as u64
}
