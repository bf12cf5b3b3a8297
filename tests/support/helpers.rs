use std::time::Duration;

use anyhow::Result;
use evm_rpc_failover::{RpcClient, RpcClientOptions};
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING_SUBSCRIBER);
}

/// Client with short timings suitable for tests against local mocks.
pub fn fast_client<S: AsRef<str>>(urls: &[S], attempt_timeout: Duration) -> Result<RpcClient> {
    let options = RpcClientOptions {
        attempt_timeout,
        retry_delay: Duration::from_millis(5),
        ..RpcClientOptions::default()
    };
    RpcClient::with_options(urls.iter().map(|url| url.as_ref().to_owned()), options)
}
