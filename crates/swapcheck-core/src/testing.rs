//! In-memory [`EthClient`] for unit tests.

use std::sync::Mutex;

use alloy_primitives::Address;
use async_trait::async_trait;
use swapcheck_rpc::{
    BlockTag, EthClient, NodeError, Transaction, TransactionReceipt, TransportError,
};

type CallHandler =
    Box<dyn Fn(Address, &[u8], BlockTag) -> Result<Vec<u8>, TransportError> + Send + Sync>;

/// Answers `eth_call` with a closure and records every call made.
pub struct ScriptedClient {
    handler: CallHandler,
    pub calls: Mutex<Vec<(Address, Vec<u8>, BlockTag)>>,
}

impl ScriptedClient {
    pub fn new(
        handler: impl Fn(Address, &[u8], BlockTag) -> Result<Vec<u8>, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn blocks(&self) -> Vec<BlockTag> {
        self.calls.lock().unwrap().iter().map(|(_, _, b)| *b).collect()
    }
}

pub fn reverted() -> TransportError {
    TransportError::Rpc(NodeError {
        code: 3,
        message: "execution reverted".into(),
        data: None,
    })
}

pub fn word(n: u128) -> String {
    format!("{n:064x}")
}

/// ABI encoding of a `uint256[]` return value.
pub fn encode_amounts(amounts: &[u128]) -> Vec<u8> {
    let mut hex = word(0x20) + &word(amounts.len() as u128);
    for a in amounts {
        hex.push_str(&word(*a));
    }
    hex::decode(hex).unwrap()
}

#[async_trait]
impl EthClient for ScriptedClient {
    fn endpoint(&self) -> &str {
        "scripted://node"
    }

    async fn chain_id(&self) -> Result<u64, TransportError> {
        Ok(1)
    }

    async fn transaction_by_hash(&self, _hash: &str) -> Result<Option<Transaction>, TransportError> {
        Ok(None)
    }

    async fn transaction_receipt(
        &self,
        _hash: &str,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        Ok(None)
    }

    async fn call(
        &self,
        to: Address,
        data: &[u8],
        block: BlockTag,
    ) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().unwrap().push((to, data.to_vec(), block));
        (self.handler)(to, data, block)
    }
}
