use crate::rpc::options::{DEFAULT_ATTEMPT_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS};
use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const ENV_ENDPOINTS: &str = "EVM_RPC_ENDPOINTS";
pub const ENV_ATTEMPT_TIMEOUT_MS: &str = "EVM_RPC_ATTEMPT_TIMEOUT_MS";
pub const ENV_RETRY_DELAY_MS: &str = "EVM_RPC_RETRY_DELAY_MS";
pub const ENV_CHAIN_ID: &str = "EVM_RPC_CHAIN_ID";

/// Endpoint list and timing knobs for [`crate::RpcClient`].
///
/// All instances must be constructed via [`RpcConfig::builder`],
/// [`RpcConfig::new`] or [`RpcConfig::from_env`] so invariants are validated
/// before any consumer observes the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    endpoints: Vec<String>,
    attempt_timeout: Duration,
    retry_delay: Duration,
    chain_id: Option<u64>,
}

pub struct RpcConfigParams {
    pub endpoints: Vec<String>,
    pub attempt_timeout: Duration,
    pub retry_delay: Duration,
    pub chain_id: Option<u64>,
}

impl RpcConfig {
    pub fn builder() -> RpcConfigBuilder {
        RpcConfigBuilder::default()
    }

    /// Trims every endpoint, drops blank entries, then validates.
    pub fn new(params: RpcConfigParams) -> Result<Self> {
        let RpcConfigParams {
            endpoints,
            attempt_timeout,
            retry_delay,
            chain_id,
        } = params;

        let config = Self {
            endpoints: endpoints
                .into_iter()
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty())
                .collect(),
            attempt_timeout,
            retry_delay,
            chain_id,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from `EVM_RPC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RpcConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoints = lookup(ENV_ENDPOINTS).with_context(|| format!("{ENV_ENDPOINTS} is not set"))?;
        let mut builder = Self::builder().endpoints(endpoints.split(','));

        if let Some(raw) = lookup(ENV_ATTEMPT_TIMEOUT_MS) {
            builder = builder.attempt_timeout(Duration::from_millis(parse_number(
                ENV_ATTEMPT_TIMEOUT_MS,
                &raw,
            )?));
        }
        if let Some(raw) = lookup(ENV_RETRY_DELAY_MS) {
            builder =
                builder.retry_delay(Duration::from_millis(parse_number(ENV_RETRY_DELAY_MS, &raw)?));
        }
        if let Some(raw) = lookup(ENV_CHAIN_ID) {
            builder = builder.chain_id(parse_number(ENV_CHAIN_ID, &raw)?);
        }

        builder.build()
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Upper bound for a single request against a single endpoint.
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Pause between a failed attempt and the next endpoint.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Chain the endpoints are expected to serve. Not checked by the client.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            bail!("endpoints must contain at least one URL");
        }
        for url in &self.endpoints {
            validate_url(url)?;
        }
        if self.attempt_timeout.is_zero() {
            bail!("attempt_timeout must be greater than 0");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RpcConfigBuilder {
    endpoints: Vec<String>,
    attempt_timeout: Option<Duration>,
    retry_delay: Option<Duration>,
    chain_id: Option<u64>,
}

impl RpcConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoints.push(url.into());
        self
    }

    pub fn endpoints<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn build(self) -> Result<RpcConfig> {
        RpcConfig::new(RpcConfigParams {
            endpoints: self.endpoints,
            attempt_timeout: self
                .attempt_timeout
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS)),
            retry_delay: self
                .retry_delay
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_RETRY_DELAY_MS)),
            chain_id: self.chain_id,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
}

fn validate_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("endpoint {url:?} must start with http:// or https://");
    }
    Ok(())
}
