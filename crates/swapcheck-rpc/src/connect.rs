//! Endpoint string → live [`EthClient`].
//!
//! `http(s)://` endpoints get an [`HttpRpcClient`], `ws(s)://` endpoints a
//! [`WsRpcClient`]. Anything else is rejected.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::eth::{EthClient, RpcEthClient, RpcTransport};
use crate::http::{HttpClientConfig, HttpRpcClient};
use crate::ws::{WsClientConfig, WsRpcClient};

/// Produces connections for node endpoints.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn EthClient>, TransportError>;
}

/// Default connector backed by the HTTP and WebSocket transports.
#[derive(Debug, Clone, Default)]
pub struct RpcConnector {
    pub http: HttpClientConfig,
    pub ws: WsClientConfig,
}

impl RpcConnector {
    pub fn new(http: HttpClientConfig, ws: WsClientConfig) -> Self {
        Self { http, ws }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Scheme {
    Http,
    Ws,
}

fn scheme_of(endpoint: &str) -> Option<Scheme> {
    let lower = endpoint.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(Scheme::Http)
    } else if lower.starts_with("ws://") || lower.starts_with("wss://") {
        Some(Scheme::Ws)
    } else {
        None
    }
}

#[async_trait]
impl Connector for RpcConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn EthClient>, TransportError> {
        let endpoint = endpoint.trim();
        let transport: Arc<dyn RpcTransport> = match scheme_of(endpoint) {
            Some(Scheme::Http) => Arc::new(HttpRpcClient::new(endpoint, self.http.clone())?),
            Some(Scheme::Ws) => Arc::new(WsRpcClient::connect(endpoint, self.ws.clone()).await?),
            None => return Err(TransportError::UnsupportedEndpoint(endpoint.to_string())),
        };
        tracing::debug!(url = %endpoint, "connection created");
        Ok(Arc::new(RpcEthClient::new(transport)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_detection() {
        assert_eq!(scheme_of("https://rpc.ankr.com/eth"), Some(Scheme::Http));
        assert_eq!(scheme_of("HTTP://localhost:8545"), Some(Scheme::Http));
        assert_eq!(scheme_of("wss://bsc-ws-node.nariox.org"), Some(Scheme::Ws));
        assert_eq!(scheme_of("ipc:///tmp/geth.ipc"), None);
    }

    #[tokio::test]
    async fn unsupported_scheme_is_rejected() {
        let connector = RpcConnector::default();
        let err = connector.connect("ftp://node").await.err().unwrap();
        assert!(matches!(err, TransportError::UnsupportedEndpoint(_)));
    }

    #[tokio::test]
    async fn http_endpoint_connects_lazily() {
        let connector = RpcConnector::default();
        let client = connector.connect(" http://127.0.0.1:8545 ").await.unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8545");
    }
}
