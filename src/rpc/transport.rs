//! HTTP layer underneath the attempt runner. Kept behind a trait so the retry
//! and classification logic can be exercised with in-memory transports.

use crate::rpc::options::RpcClientOptions;
use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};

/// Raw HTTP reply; the status is kept for diagnostics only, since a JSON-RPC
/// `error` body is honoured regardless of status.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

pub trait RpcTransport: Send + Sync {
    /// POSTs one JSON body to `endpoint`. Dropping the returned future aborts
    /// the request.
    fn post<'a>(&'a self, endpoint: &'a str, body: Vec<u8>) -> BoxFuture<'a, Result<HttpReply>>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(options: &RpcClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&options.user_agent)
            .context("failed to build User-Agent header")?;
        headers.insert(USER_AGENT, agent);

        // No idle connections are kept between attempts.
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|err| anyhow!("failed to build HTTP client: {err}"))?;

        Ok(Self { client })
    }
}

impl RpcTransport for HttpTransport {
    fn post<'a>(&'a self, endpoint: &'a str, body: Vec<u8>) -> BoxFuture<'a, Result<HttpReply>> {
        Box::pin(async move {
            let response = self
                .client
                .post(endpoint)
                .body(body)
                .send()
                .await
                .with_context(|| format!("POST {endpoint} failed"))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .with_context(|| format!("failed to read response body from {endpoint}"))?;

            Ok(HttpReply {
                status,
                body: body.to_vec(),
            })
        })
    }
}
