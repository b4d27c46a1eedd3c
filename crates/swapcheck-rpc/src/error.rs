//! Transport-level error types.

use thiserror::Error;

use crate::wire::NodeError;

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, non-2xx status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// WebSocket connection/send/receive error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(NodeError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Endpoint string is not a usable URL for any transport.
    #[error("Unsupported endpoint: {0}")]
    UnsupportedEndpoint(String),

    /// Node returned a value in an unexpected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::WebSocket(_) | Self::Timeout { .. }
        )
    }

    /// Returns `true` if the node executed the request and rejected it
    /// (revert, missing trie node, unknown method).
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(TransportError::Http("connection reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 10_000 }.is_retryable());
        assert!(!TransportError::Malformed("0xzz".into()).is_retryable());
    }

    #[test]
    fn rpc_errors_are_execution_errors() {
        let err = TransportError::Rpc(NodeError {
            code: -32000,
            message: "missing trie node".into(),
            data: None,
        });
        assert!(err.is_execution_error());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "RPC error -32000: missing trie node");
    }
}
