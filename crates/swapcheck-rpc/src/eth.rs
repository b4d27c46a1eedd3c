//! Typed `eth_*` client over any [`RpcTransport`].
//!
//! [`RpcTransport`] moves one [`RpcCall`] to a node and brings back its
//! [`RpcReply`]; [`RpcEthClient`] builds the calls and reads the replies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::types::{decode_hex, parse_hex_u64, BlockTag, Transaction, TransactionReceipt};
use crate::wire::{RpcCall, RpcReply};

/// A connection to one node endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send `call` and wait for the reply carrying its id.
    async fn roundtrip(&self, call: RpcCall) -> Result<RpcReply, TransportError>;

    /// Endpoint URL.
    fn url(&self) -> &str;
}

/// The node operations the swap checker relies on.
///
/// Object-safe; shared as `Arc<dyn EthClient>`.
#[async_trait]
pub trait EthClient: Send + Sync {
    /// Endpoint this client talks to (for logging).
    fn endpoint(&self) -> &str;

    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<u64, TransportError>;

    /// `eth_getTransactionByHash`; `None` when the node does not know the hash.
    async fn transaction_by_hash(&self, hash: &str) -> Result<Option<Transaction>, TransportError>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is unmined.
    async fn transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, TransportError>;

    /// `eth_call` against `to` with raw calldata, returning the raw output.
    async fn call(&self, to: Address, data: &[u8], block: BlockTag)
        -> Result<Vec<u8>, TransportError>;
}

/// [`EthClient`] implementation that issues JSON-RPC over a transport.
pub struct RpcEthClient {
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl RpcEthClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.transport
            .roundtrip(RpcCall::new(id, method, params))
            .await?
            .decode()
    }
}

#[async_trait]
impl EthClient for RpcEthClient {
    fn endpoint(&self) -> &str {
        self.transport.url()
    }

    async fn chain_id(&self) -> Result<u64, TransportError> {
        let raw: String = self.request("eth_chainId", vec![]).await?;
        parse_hex_u64(&raw)
            .ok_or_else(|| TransportError::Malformed(format!("chain id '{raw}'")))
    }

    async fn transaction_by_hash(&self, hash: &str) -> Result<Option<Transaction>, TransportError> {
        self.request("eth_getTransactionByHash", vec![json!(hash)])
            .await
    }

    async fn transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        self.request("eth_getTransactionReceipt", vec![json!(hash)])
            .await
    }

    async fn call(
        &self,
        to: Address,
        data: &[u8],
        block: BlockTag,
    ) -> Result<Vec<u8>, TransportError> {
        let params = vec![
            json!({
                "to": to.to_string(),
                "data": format!("0x{}", hex::encode(data)),
            }),
            block.to_param(),
        ];
        let raw: String = self.request("eth_call", params).await?;
        decode_hex(&raw)
    }
}
