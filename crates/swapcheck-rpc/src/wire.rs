//! The `eth_*` calls on the wire.
//!
//! Only what the client sends and reads back is modelled: numeric ids,
//! positional params and a reply that is either a `result` or an `error`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// One outgoing call.
#[derive(Debug, Clone, Serialize)]
pub struct RpcCall {
    jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Vec<Value>,
}

impl RpcCall {
    pub fn new(id: u64, method: &'static str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// The `error` member of a reply: the node ran the call and refused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A reply matched to a call by `id`.
///
/// Messages without a numeric id (subscription pushes) deserialize with
/// `id: None` and are never matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcReply {
    #[serde(default, deserialize_with = "numeric_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<NodeError>,
}

fn numeric_id<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| v.as_u64()))
}

impl RpcReply {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: NodeError) -> Self {
        Self {
            id: Some(id),
            result: None,
            error: Some(error),
        }
    }

    /// Deserialize `result` into `T`.
    ///
    /// A reply with neither member reads as `null`, which is how nodes
    /// answer lookups of unknown transactions and receipts.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, TransportError> {
        if let Some(err) = self.error {
            return Err(TransportError::Rpc(err));
        }
        serde_json::from_value(self.result.unwrap_or(Value::Null))
            .map_err(TransportError::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_wire_shape() {
        let call = RpcCall::new(7, "eth_getTransactionByHash", vec![Value::from("0xabc")]);
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "eth_getTransactionByHash",
                "params": ["0xabc"]
            })
        );
    }

    #[test]
    fn missing_result_decodes_as_none() {
        let reply: RpcReply = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert_eq!(reply.id, Some(1));
        assert_eq!(reply.decode::<Option<String>>().unwrap(), None);
    }

    #[test]
    fn node_error_wins_over_result() {
        let reply: RpcReply = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap();
        let err = reply.decode::<String>().unwrap_err();
        assert!(matches!(err, TransportError::Rpc(NodeError { code: -32000, .. })));
    }

    #[test]
    fn notifications_have_no_id() {
        let reply: RpcReply = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"eth_subscription","params":{}}"#,
        )
        .unwrap();
        assert_eq!(reply.id, None);
        let reply: RpcReply =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc","result":"0x1"}"#).unwrap();
        assert_eq!(reply.id, None);
    }
}
