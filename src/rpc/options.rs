//! Configurable knobs for the RPC client along with validation so callers can
//! reason about attempt timeouts and the delay between endpoints.

use anyhow::{bail, Result};
use std::time::Duration;

pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 12_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 50;
const DEFAULT_USER_AGENT: &str = concat!("evm-rpc-failover/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct RpcClientOptions {
    pub attempt_timeout: Duration,
    /// Fixed pause between a failed attempt and the next endpoint.
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for RpcClientOptions {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl RpcClientOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.attempt_timeout.is_zero() {
            bail!("attempt_timeout must be greater than 0");
        }
        if self.user_agent.trim().is_empty() {
            bail!("user_agent cannot be empty");
        }
        Ok(())
    }
}
