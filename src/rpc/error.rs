//! Error types produced by single attempts and by whole calls. Per-attempt
//! failures never leave the client on their own; callers only ever observe an
//! [`RpcError`], usually `Exhausted` wrapping the last [`AttemptError`].

use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Coarse classification of an attempt failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failure, timeout, or an undecodable response body.
    Network,
    /// The endpoint answered with a JSON-RPC `error` object.
    Protocol,
}

/// Failure of exactly one request against exactly one endpoint.
#[derive(Debug)]
pub enum AttemptError {
    Timeout {
        endpoint: String,
        after: Duration,
    },
    Transport {
        endpoint: String,
        source: anyhow::Error,
    },
    Decode {
        endpoint: String,
        status: u16,
        reason: String,
    },
    Protocol {
        endpoint: String,
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

impl AttemptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AttemptError::Protocol { .. } => FailureKind::Protocol,
            AttemptError::Timeout { .. }
            | AttemptError::Transport { .. }
            | AttemptError::Decode { .. } => FailureKind::Network,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            AttemptError::Timeout { endpoint, .. }
            | AttemptError::Transport { endpoint, .. }
            | AttemptError::Decode { endpoint, .. }
            | AttemptError::Protocol { endpoint, .. } => endpoint,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Timeout { .. })
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Timeout { endpoint, after } => {
                write!(f, "request to {endpoint} timed out after {}ms", after.as_millis())
            }
            AttemptError::Transport { endpoint, source } => {
                write!(f, "transport error talking to {endpoint}: {source:#}")
            }
            AttemptError::Decode {
                endpoint,
                status,
                reason,
            } => write!(
                f,
                "malformed response from {endpoint} (http status {status}): {reason}"
            ),
            AttemptError::Protocol {
                endpoint,
                code,
                message,
                data,
            } => {
                if let Some(data) = data {
                    write!(
                        f,
                        "{endpoint} returned rpc error (code={code}, message={message}, data={data})"
                    )
                } else {
                    write!(
                        f,
                        "{endpoint} returned rpc error (code={code}, message={message})"
                    )
                }
            }
        }
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttemptError::Transport { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// Error surfaced to callers of the client.
#[derive(Debug)]
pub enum RpcError {
    /// Every endpoint failed for this call; `last` is the failure of the
    /// endpoint probed last.
    Exhausted {
        method: String,
        attempts: usize,
        last: Option<AttemptError>,
    },
    /// The caller cancelled the call before any endpoint succeeded.
    Cancelled { method: String },
}

impl RpcError {
    pub fn last_attempt(&self) -> Option<&AttemptError> {
        match self {
            RpcError::Exhausted { last, .. } => last.as_ref(),
            RpcError::Cancelled { .. } => None,
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Exhausted {
                method,
                attempts,
                last: Some(last),
            } => write!(
                f,
                "rpc method {method} failed on all endpoints after {attempts} attempts; last error: {last}"
            ),
            RpcError::Exhausted {
                method,
                last: None,
                ..
            } => write!(f, "rpc method {method}: all endpoints failed"),
            RpcError::Cancelled { method } => write!(f, "rpc method {method} was cancelled"),
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcError::Exhausted {
                last: Some(last), ..
            } => Some(last),
            _ => None,
        }
    }
}
