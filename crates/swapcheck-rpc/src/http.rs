//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! Transient failures (connection errors, non-2xx status, timeouts) are
//! retried on a `tokio-retry` exponential backoff. Node-side errors such as
//! reverts are returned immediately; retrying those is the caller's decision.

use std::time::Duration;

use async_trait::async_trait;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

use crate::error::TransportError;
use crate::eth::RpcTransport;
use crate::wire::{RpcCall, RpcReply};

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Retries after the first attempt, transient failures only.
    pub max_retries: usize,
    /// Delay before the first retry; doubles on each further one.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpClientConfig {
    /// Delays between attempts.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        // ExponentialBackoff yields factor * 2^n ms starting at n = 1.
        let factor = (self.initial_backoff.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_backoff)
            .take(self.max_retries)
    }
}

/// HTTP JSON-RPC client.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            config,
        })
    }

    async fn post(&self, call: &RpcCall) -> Result<RpcReply, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(call)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        ms: self.config.request_timeout.as_millis() as u64,
                    }
                } else {
                    TransportError::Http(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {}: {body}", status.as_u16())));
        }

        resp.json::<RpcReply>()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn roundtrip(&self, call: RpcCall) -> Result<RpcReply, TransportError> {
        let mut failures = 0u32;
        RetryIf::spawn(
            self.config.backoff(),
            || self.post(&call),
            |e: &TransportError| {
                failures += 1;
                let transient = e.is_retryable();
                if transient {
                    tracing::warn!(
                        failures,
                        error = %e,
                        url = %self.url,
                        method = call.method,
                        "transient request failure"
                    );
                }
                transient
            },
        )
        .await
    }

    fn url(&self) -> &str {
        &self.url
    }
}
