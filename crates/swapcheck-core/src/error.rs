//! Error types for swap reconstruction.
//!
//! [`CheckerError`] is fatal: the report cannot be produced. [`EnrichmentError`]
//! describes a field that could not be resolved; callers absorb it with a
//! default and log it at `warn`.

use std::path::PathBuf;

use swapcheck_abi::AbiError;
use swapcheck_rpc::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("transaction {hash} is not detected in any registered network")]
    TransactionNotFound { hash: String },

    #[error("transaction {hash} doesn't have a receipt yet or is not finished")]
    ReceiptNotFound { hash: String },

    #[error("method '{method}' has no swap path")]
    UnsupportedSwapMethod { method: String },

    #[error("no networks registered")]
    NoNetworks,

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("abi: {0}")]
    Abi(#[from] AbiError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// A per-field lookup that failed and was replaced by a default.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("chain {chain_id} not identified")]
    ChainUnidentified { chain_id: u64 },

    #[error("chain id unavailable: {reason}")]
    ChainIdUnavailable { reason: String },

    #[error("router {address} not identified")]
    RouterUnidentified { address: String },

    #[error("token {token}: {field} unavailable: {reason}")]
    TokenMetadataUnavailable {
        token: String,
        field: &'static str,
        reason: String,
    },

    #[error("no quote for {from} -> {to} after {attempts} attempts: {reason}")]
    PriceQuoteUnavailable {
        from: String,
        to: String,
        attempts: u32,
        reason: String,
    },
}

/// Registry loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid chain id '{0}'")]
    InvalidChainId(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid fee rate '{0}'")]
    InvalidFee(String),
}
