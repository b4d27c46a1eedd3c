//! Typed views over `eth_getTransactionByHash` / `eth_getTransactionReceipt`
//! results.
//!
//! Quantities stay as the node's hex strings; helpers parse them on demand.
//! Fields not modelled here are kept in `other` so a transaction can be
//! echoed back without losing anything the node returned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// Block selector for state reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl BlockTag {
    /// JSON-RPC parameter form: `"latest"` or a hex quantity.
    pub fn to_param(self) -> Value {
        match self {
            Self::Latest => Value::String("latest".into()),
            Self::Number(n) => Value::String(format!("{n:#x}")),
        }
    }
}

impl std::fmt::Display for BlockTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    pub input: String,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Transaction {
    /// Block number, or `None` while the transaction is pending.
    pub fn block_number_u64(&self) -> Option<u64> {
        self.block_number.as_deref().and_then(parse_hex_u64)
    }

    /// Calldata bytes (selector included).
    pub fn input_bytes(&self) -> Result<Vec<u8>, TransportError> {
        decode_hex(&self.input)
    }
}

/// A receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<Log>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl TransactionReceipt {
    /// `Some(true)` for success, `Some(false)` for a revert, `None` for
    /// pre-Byzantium receipts without a status field.
    pub fn succeeded(&self) -> Option<bool> {
        self.status.as_deref().and_then(parse_hex_u64).map(|s| s == 1)
    }
}

/// A raw EVM log entry from a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: Option<bool>,
}

impl Log {
    /// Non-indexed payload bytes.
    pub fn data_bytes(&self) -> Result<Vec<u8>, TransportError> {
        decode_hex(&self.data)
    }
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

/// Decode `0x`-prefixed hex data; `"0x"` and `""` decode to no bytes.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, TransportError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| TransportError::Malformed(format!("invalid hex data: {e}")))
}
