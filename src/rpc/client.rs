//! Multi-endpoint JSON-RPC client for EVM nodes. Houses `RpcClient`, which
//! walks the endpoint list from the sticky position until one endpoint answers,
//! plus the `eth_*` convenience calls built on top of it.

use crate::config::RpcConfig;
use crate::rpc::attempt::{run_attempt, AttemptOutcome};
use crate::rpc::endpoints::EndpointRotator;
use crate::rpc::envelope::RpcRequest;
use crate::rpc::error::RpcError;
use crate::rpc::metrics::{RpcMetrics, RpcMetricsSnapshot};
use crate::rpc::options::RpcClientOptions;
use crate::rpc::retry::{sleep_with_cancellation, CallContext, RetryPolicy};
use crate::rpc::transport::{HttpTransport, RpcTransport};
use crate::rpc::wire::parse_hex_quantity;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cheap to clone; clones share endpoints, the request-id counter, the sticky
/// index and metrics.
#[derive(Clone)]
pub struct RpcClient {
    endpoints: Arc<EndpointRotator>,
    transport: Arc<dyn RpcTransport>,
    options: RpcClientOptions,
    policy: RetryPolicy,
    next_id: Arc<AtomicU64>,
    metrics: Arc<RpcMetrics>,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoints", &self.endpoints.urls())
            .field("sticky_index", &self.endpoints.sticky_index())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    pub fn new<I, S>(endpoints: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(endpoints, RpcClientOptions::default())
    }

    pub fn with_options<I, S>(endpoints: I, options: RpcClientOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transport = HttpTransport::new(&options)?;
        Self::with_transport(endpoints, options, Arc::new(transport))
    }

    /// Builds a client on top of a custom transport.
    pub fn with_transport<I, S>(
        endpoints: I,
        options: RpcClientOptions,
        transport: Arc<dyn RpcTransport>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        options.validate()?;
        let endpoints = EndpointRotator::new(endpoints)?;
        let policy = RetryPolicy::per_endpoint(endpoints.len(), options.retry_delay);

        Ok(Self {
            endpoints: Arc::new(endpoints),
            transport,
            options,
            policy,
            next_id: Arc::new(AtomicU64::new(1)),
            metrics: Arc::new(RpcMetrics::default()),
        })
    }

    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        let options = RpcClientOptions {
            attempt_timeout: config.attempt_timeout(),
            retry_delay: config.retry_delay(),
            ..RpcClientOptions::default()
        };
        Self::with_options(config.endpoints().iter().cloned(), options)
    }

    pub fn endpoints(&self) -> &[String] {
        self.endpoints.urls()
    }

    pub fn sticky_index(&self) -> usize {
        self.endpoints.sticky_index()
    }

    /// Order in which the next call will try endpoints.
    pub fn probe_order(&self) -> Vec<(usize, &str)> {
        self.endpoints.probe_order()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn metrics(&self) -> RpcMetricsSnapshot {
        self.metrics.snapshot(self.endpoints.sticky_index())
    }

    /// Calls `method` and returns the raw `result` value.
    ///
    /// Endpoints are probed one at a time starting from the last endpoint that
    /// succeeded. Only when all of them fail does the call return an error,
    /// an [`RpcError::Exhausted`] carrying the last attempt's failure.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        self.call_with_cancellation(method, params, &CancellationToken::new())
            .await
    }

    /// Like [`RpcClient::call`], but gives up with [`RpcError::Cancelled`] as
    /// soon as `cancel` fires. The sticky index is left untouched.
    pub async fn call_with_cancellation(
        &self,
        method: &str,
        params: &[Value],
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let context = CallContext::new(method);
        let order = self.endpoints.probe_order();
        context.log_probe_order(&order);

        let mut attempts = 0;
        let mut last_error = None;

        for (index, endpoint) in order.into_iter().take(self.policy.max_attempts) {
            attempts += 1;
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let request = RpcRequest::new(id, method, params);
            let start = Instant::now();

            let outcome = run_attempt(
                self.transport.as_ref(),
                endpoint,
                &request,
                self.options.attempt_timeout,
                cancel,
            )
            .await;

            match outcome {
                AttemptOutcome::Success(value) => {
                    self.metrics.record_success(start.elapsed());
                    self.endpoints.record_success(index);
                    context.log_success(attempts, id, index, endpoint);
                    return Ok(value);
                }
                AttemptOutcome::Cancelled => {
                    context.log_cancelled(attempts);
                    return Err(RpcError::Cancelled {
                        method: method.to_owned(),
                    }
                    .into());
                }
                AttemptOutcome::Failure(err) => {
                    self.metrics.record_failure(start.elapsed(), &err);
                    let delay = self.policy.delay_after(attempts);
                    context.log_failure(attempts, id, &err, delay);
                    last_error = Some(err);

                    if let Some(delay) = delay {
                        if !sleep_with_cancellation(delay, cancel).await {
                            context.log_cancelled(attempts);
                            return Err(RpcError::Cancelled {
                                method: method.to_owned(),
                            }
                            .into());
                        }
                    }
                }
            }
        }

        self.metrics.record_exhausted();
        context.log_exhausted(attempts, last_error.as_ref());
        Err(RpcError::Exhausted {
            method: method.to_owned(),
            attempts,
            last: last_error,
        }
        .into())
    }

    /// [`RpcClient::call`] followed by deserialization of the result.
    pub async fn request<T>(&self, method: &str, params: &[Value]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).with_context(|| format!("failed to decode {method} result"))
    }

    pub async fn block_number(&self) -> Result<u64> {
        self.hex_quantity("eth_blockNumber").await
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.hex_quantity("eth_chainId").await
    }

    /// Fetches raw log entries matching `filter`. Entries are returned as the
    /// node sent them, in order, without decoding.
    pub async fn get_logs<F>(&self, filter: &F) -> Result<Vec<Value>>
    where
        F: Serialize + ?Sized,
    {
        const METHOD: &str = "eth_getLogs";

        let filter = serde_json::to_value(filter).context("failed to serialize log filter")?;
        match self.call(METHOD, &[filter]).await? {
            Value::Array(logs) => Ok(logs),
            other => bail!("{METHOD} returned a non-array result: {other}"),
        }
    }

    async fn hex_quantity(&self, method: &str) -> Result<u64> {
        let raw: String = self.request(method, &[]).await?;
        let value = parse_hex_quantity(&raw)
            .with_context(|| format!("{method} returned an invalid quantity"))?;
        u64::try_from(value)
            .map_err(|_| anyhow::anyhow!("{method} result {raw} does not fit in u64"))
    }
}
