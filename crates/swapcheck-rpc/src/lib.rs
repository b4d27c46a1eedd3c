//! swapcheck-rpc: the chain connection layer for swapcheck.
//!
//! # Overview
//!
//! Everything the swap checker needs to talk to an EVM node:
//!
//! - [`RpcTransport`]: the async trait every transport implements
//! - [`HttpRpcClient`] / [`WsRpcClient`]: HTTP and WebSocket transports
//! - [`EthClient`]: typed `eth_*` calls (transaction, receipt, chain id, call)
//! - [`Connector`]: turns an endpoint string into a live [`EthClient`]
//! - [`TransportError`]: structured error type

pub mod connect;
pub mod error;
pub mod eth;
pub mod http;
pub mod types;
pub mod wire;
pub mod ws;

pub use connect::{Connector, RpcConnector};
pub use error::TransportError;
pub use eth::{EthClient, RpcEthClient, RpcTransport};
pub use http::{HttpClientConfig, HttpRpcClient};
pub use types::{decode_hex, parse_hex_u64, BlockTag, Log, Transaction, TransactionReceipt};
pub use wire::{NodeError, RpcCall, RpcReply};
pub use ws::{WsClientConfig, WsRpcClient};
