//! One request against one endpoint, bounded by a timeout and a cancellation
//! token, classified into exactly one outcome.

use crate::rpc::envelope::{decode_reply, RpcReply, RpcRequest};
use crate::rpc::error::AttemptError;
use crate::rpc::transport::RpcTransport;
use anyhow::anyhow;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    Success(Value),
    Failure(AttemptError),
    Cancelled,
}

/// Runs a single attempt.
///
/// The request future and its timer are owned by this function and dropped
/// before it returns, whichever branch finishes first.
pub(crate) async fn run_attempt(
    transport: &dyn RpcTransport,
    endpoint: &str,
    request: &RpcRequest<'_>,
    limit: Duration,
    cancel: &CancellationToken,
) -> AttemptOutcome {
    let body = match request.to_body() {
        Ok(body) => body,
        Err(err) => {
            return AttemptOutcome::Failure(AttemptError::Transport {
                endpoint: endpoint.to_owned(),
                source: anyhow!("failed to encode request {}: {err}", request.method),
            })
        }
    };

    let reply = tokio::select! {
        biased;
        _ = cancel.cancelled() => return AttemptOutcome::Cancelled,
        reply = timeout(limit, transport.post(endpoint, body)) => reply,
    };

    let reply = match reply {
        Err(_) => {
            return AttemptOutcome::Failure(AttemptError::Timeout {
                endpoint: endpoint.to_owned(),
                after: limit,
            })
        }
        Ok(Err(source)) => {
            return AttemptOutcome::Failure(AttemptError::Transport {
                endpoint: endpoint.to_owned(),
                source,
            })
        }
        Ok(Ok(reply)) => reply,
    };

    match decode_reply(&reply.body) {
        Ok(RpcReply::Result(value)) => AttemptOutcome::Success(value),
        Ok(RpcReply::Error(err)) => AttemptOutcome::Failure(AttemptError::Protocol {
            endpoint: endpoint.to_owned(),
            code: err.code,
            message: err.message,
            data: err.data,
        }),
        Err(reason) => AttemptOutcome::Failure(AttemptError::Decode {
            endpoint: endpoint.to_owned(),
            status: reply.status,
            reason,
        }),
    }
}
