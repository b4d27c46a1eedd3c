//! End-to-end reconstruction against in-memory chains.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use swapcheck_abi::{AbiDecoder, AbiValue, ContractInterface, ROUTER_ABI};
use swapcheck_core::{
    CheckerError, NodeRegistry, QuotePolicy, RouterRegistry, SwapChecker, SwapReport, SwapState,
    TokenDetail,
};
use swapcheck_rpc::{
    BlockTag, Connector, EthClient, NodeError, Transaction, TransactionReceipt, TransportError,
};

const ROUTER: &str = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";
const UNKNOWN_ROUTER: &str = "0x1111111254eeb25477b68fb85ed929f73a960582";
const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const USDT: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";
const PEPE: &str = "0x6982508145454ce325ddbe47a25d4ec3d2311933";
const PAIR: &str = "0x0d4a11d5eeaac28ec3f61d100daf4d40471f1852";
const RECIPIENT: &str = "0x2222222222222222222222222222222222222222";
const SWAP_TOPIC: &str = "0xd78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822";
const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

const HASH: &str = "0x2b1d2c9c20535c51404000b3414280854136ef55c21e60ddab226f18e15e9a76";
const OTHER_HASH: &str = "0x9f0ee3b0a1c7b40dd1a2e7de0fd7d1b0b1a3a5bb34e4dc2b31f3c3b6b4e8e111";
const BLOCK: u64 = 16_000_000;

const E18: u128 = 1_000_000_000_000_000_000;

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

fn word(n: U256) -> String {
    hex::encode(n.to_be_bytes::<32>())
}

fn topic_for(address: &str) -> String {
    format!("0x{:0>64}", address.trim_start_matches("0x"))
}

fn reverted() -> TransportError {
    TransportError::Rpc(NodeError {
        code: 3,
        message: "execution reverted".into(),
        data: None,
    })
}

// ─── Mock chain ──────────────────────────────────────────────────────────────

struct MockChain {
    endpoint: String,
    chain_id: u64,
    txs: HashMap<String, Transaction>,
    receipts: HashMap<String, TransactionReceipt>,
    tokens: HashMap<Address, (&'static str, u8)>,
    /// (from, to) → (numerator, denominator) applied to the input amount.
    rates: HashMap<(Address, Address), (U256, U256)>,
    quote_outage: bool,
    router_calls: AbiDecoder,
    tx_lookups: AtomicUsize,
    receipt_lookups: AtomicUsize,
    quote_blocks: Mutex<Vec<BlockTag>>,
}

impl MockChain {
    fn new(endpoint: &str, chain_id: u64) -> Self {
        let mut chain = Self {
            endpoint: endpoint.to_string(),
            chain_id,
            txs: HashMap::new(),
            receipts: HashMap::new(),
            tokens: HashMap::new(),
            rates: HashMap::new(),
            quote_outage: false,
            router_calls: AbiDecoder::new().with_abi_json(ROUTER_ABI).unwrap(),
            tx_lookups: AtomicUsize::new(0),
            receipt_lookups: AtomicUsize::new(0),
            quote_blocks: Mutex::new(vec![]),
        };
        chain.tokens.insert(addr(WETH), ("Wrapped Ether", 18));
        chain.tokens.insert(addr(USDT), ("Tether USD", 6));
        chain.tokens.insert(addr(PEPE), ("Pepe", 18));
        // 1 WETH = 2000 USDT, 1 PEPE = 0.001 WETH
        chain.set_rate(WETH, USDT, U256::from(2_000_000_000u64), U256::from(E18));
        chain.set_rate(USDT, WETH, U256::from(E18), U256::from(2_000_000_000u64));
        chain.set_rate(PEPE, WETH, U256::from(1u64), U256::from(1_000u64));
        chain
    }

    fn set_rate(&mut self, from: &str, to: &str, num: U256, den: U256) {
        self.rates.insert((addr(from), addr(to)), (num, den));
    }

    fn with_tx(mut self, tx: Transaction, receipt: Option<TransactionReceipt>) -> Self {
        if let Some(r) = receipt {
            self.receipts.insert(tx.hash.clone(), r);
        }
        self.txs.insert(tx.hash.clone(), tx);
        self
    }

    fn with_quote_outage(mut self) -> Self {
        self.quote_outage = true;
        self
    }

    fn tx_lookups(&self) -> usize {
        self.tx_lookups.load(Ordering::SeqCst)
    }

    fn quote_blocks(&self) -> Vec<BlockTag> {
        self.quote_blocks.lock().unwrap().clone()
    }

    fn answer_quote(&self, data: &[u8], block: BlockTag) -> Result<Vec<u8>, TransportError> {
        self.quote_blocks.lock().unwrap().push(block);
        if self.quote_outage {
            return Err(reverted());
        }
        let call = self.router_calls.decode_method(data).ok_or_else(reverted)?;
        let amount = call.param("amountIn").and_then(AbiValue::as_uint).ok_or_else(reverted)?;
        let path = call.param("path").and_then(AbiValue::as_address_array).ok_or_else(reverted)?;
        let (num, den) = self.rates.get(&(path[0], path[1])).ok_or_else(reverted)?;
        let out = amount * *num / *den;
        let encoded = format!(
            "{}{}{}{}",
            word(U256::from(0x20u64)),
            word(U256::from(2u64)),
            word(amount),
            word(out)
        );
        Ok(hex::decode(encoded).unwrap())
    }
}

#[async_trait]
impl EthClient for MockChain {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chain_id(&self) -> Result<u64, TransportError> {
        Ok(self.chain_id)
    }

    async fn transaction_by_hash(&self, hash: &str) -> Result<Option<Transaction>, TransportError> {
        self.tx_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.txs.get(hash).cloned())
    }

    async fn transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        self.receipt_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.get(hash).cloned())
    }

    async fn call(
        &self,
        to: Address,
        data: &[u8],
        block: BlockTag,
    ) -> Result<Vec<u8>, TransportError> {
        match hex::encode(&data[..4]).as_str() {
            "d06ca61f" => self.answer_quote(data, block),
            "06fdde03" => {
                let (name, _) = self.tokens.get(&to).ok_or_else(reverted)?;
                let encoded = format!(
                    "{}{}{:0<64}",
                    word(U256::from(0x20u64)),
                    word(U256::from(name.len())),
                    hex::encode(name)
                );
                Ok(hex::decode(encoded).unwrap())
            }
            "313ce567" => {
                let (_, decimals) = self.tokens.get(&to).ok_or_else(reverted)?;
                Ok(hex::decode(word(U256::from(*decimals))).unwrap())
            }
            _ => Err(reverted()),
        }
    }
}

#[derive(Default)]
struct MockConnector {
    chains: HashMap<String, Arc<MockChain>>,
}

impl MockConnector {
    fn with(mut self, chain: &Arc<MockChain>) -> Self {
        self.chains.insert(chain.endpoint.clone(), chain.clone());
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn EthClient>, TransportError> {
        match self.chains.get(endpoint) {
            Some(chain) => Ok(chain.clone() as Arc<dyn EthClient>),
            None => Err(TransportError::Http(format!("connection refused: {endpoint}"))),
        }
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn nodes() -> NodeRegistry {
    NodeRegistry::from_json(
        r#"{
            "1":  { "name": "Ethereum",        "rpc": "mock://eth" },
            "56": { "name": "BNB Smart Chain", "rpc": "mock://bsc" }
        }"#,
    )
    .unwrap()
}

fn routers() -> RouterRegistry {
    RouterRegistry::from_json(&format!(
        r#"{{
            "{ROUTER}": {{
                "weth_address": "{WETH}",
                "usdt_address": "{USDT}",
                "usdt_decimal": 6,
                "swap_fee": 0.003
            }}
        }}"#
    ))
    .unwrap()
}

fn swap_input(path: &[&str]) -> String {
    let router = ContractInterface::from_abi_json(ROUTER_ABI).unwrap();
    let data = router
        .encode_call(
            "swapExactTokensForTokens",
            &[
                AbiValue::Uint(U256::from(E18)),
                AbiValue::Uint(U256::ZERO),
                AbiValue::Array(path.iter().map(|p| AbiValue::Address(addr(p))).collect()),
                AbiValue::Address(addr(RECIPIENT)),
                AbiValue::Uint(U256::from(1_700_000_000u64)),
            ],
        )
        .unwrap();
    format!("0x{}", hex::encode(data))
}

fn transaction(hash: &str, to: &str, input: &str) -> Transaction {
    serde_json::from_value(json!({
        "hash": hash,
        "blockHash": "0x".to_string() + &"ab".repeat(32),
        "blockNumber": format!("{BLOCK:#x}"),
        "from": RECIPIENT,
        "to": to,
        "value": "0x0",
        "input": input,
        "gas": "0x3d090",
        "nonce": "0x7"
    }))
    .unwrap()
}

fn swap_log(amount0_in: U256, amount1_out: U256) -> Value {
    json!({
        "address": PAIR,
        "topics": [SWAP_TOPIC, topic_for(ROUTER), topic_for(RECIPIENT)],
        "data": format!(
            "0x{}{}{}{}",
            word(amount0_in),
            word(U256::ZERO),
            word(U256::ZERO),
            word(amount1_out)
        ),
        "logIndex": "0x1"
    })
}

fn transfer_log(value: U256) -> Value {
    json!({
        "address": WETH,
        "topics": [TRANSFER_TOPIC, topic_for(RECIPIENT), topic_for(PAIR)],
        "data": format!("0x{}", word(value)),
        "logIndex": "0x0"
    })
}

fn receipt(hash: &str, logs: Vec<Value>) -> TransactionReceipt {
    serde_json::from_value(json!({
        "transactionHash": hash,
        "blockNumber": format!("{BLOCK:#x}"),
        "status": "0x1",
        "logs": logs
    }))
    .unwrap()
}

fn buy_chain() -> MockChain {
    MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &swap_input(&[WETH, USDT])),
        Some(receipt(
            HASH,
            vec![swap_log(U256::from(E18), U256::from(2_000_000u64))],
        )),
    )
}

fn checker(connector: MockConnector) -> SwapChecker {
    SwapChecker::new(nodes(), routers(), Arc::new(connector)).unwrap()
}

fn detail(name: &str, decimals: u8) -> TokenDetail {
    TokenDetail {
        name: name.into(),
        decimals,
    }
}

// ─── Classification & amounts ────────────────────────────────────────────────

#[tokio::test]
async fn buy_is_reconstructed_end_to_end() {
    let eth = Arc::new(buy_chain());
    let checker = checker(MockConnector::default().with(&eth));

    let report = checker.reconstruct(HASH).await.unwrap();
    let swap = &report.swap;

    assert_eq!(report.transaction.chain, "Ethereum");
    assert_eq!(swap.state, SwapState::Buy);
    assert_eq!(swap.swap_at_block, Some(BLOCK));
    assert_eq!(swap.recipient, RECIPIENT);
    assert_eq!(swap.token_0, detail("Wrapped Ether", 18));
    assert_eq!(swap.token_1, detail("Tether USD", 6));

    assert_eq!(swap.original_amount.token_0, "1.0");
    assert_eq!(swap.original_amount.token_1, "2.0");
    assert_eq!(swap.original_amount.estimated_fee, "0.003");

    assert_eq!(swap.weth_amount.token_0, "1.0");
    assert_eq!(swap.weth_amount.token_1, "0.001");
    assert_eq!(swap.weth_amount.estimated_fee, "0.003");

    assert_eq!(swap.usdt_amount.token_0, "2000.0");
    assert_eq!(swap.usdt_amount.token_1, "2.0");
    assert_eq!(swap.usdt_amount.estimated_fee, "6.0");

    // Quotes are read at the transaction's block.
    assert!(eth.quote_blocks().iter().all(|b| *b == BlockTag::Number(BLOCK)));
}

#[tokio::test]
async fn sell_converts_the_in_leg() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &swap_input(&[PEPE, WETH])),
        Some(receipt(
            HASH,
            vec![swap_log(U256::from(500 * E18), U256::from(E18 / 2))],
        )),
    ));
    let checker = checker(MockConnector::default().with(&eth));

    let swap = checker.reconstruct(HASH).await.unwrap().swap;
    assert_eq!(swap.state, SwapState::Sell);
    assert_eq!(swap.token_0, detail("Pepe", 18));
    assert_eq!(swap.token_1, detail("Wrapped Ether", 18));

    assert_eq!(swap.original_amount.token_0, "500.0");
    assert_eq!(swap.original_amount.token_1, "0.5");
    assert_eq!(swap.original_amount.estimated_fee, "1.5");
    assert_eq!(swap.weth_amount.token_0, "0.5");
    assert_eq!(swap.weth_amount.token_1, "0.5");
    assert_eq!(swap.usdt_amount.token_0, "1000.0");
    assert_eq!(swap.usdt_amount.token_1, "1000.0");
}

#[tokio::test]
async fn token_to_token_converts_both_legs() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &swap_input(&[PEPE, USDT])),
        Some(receipt(
            HASH,
            vec![swap_log(U256::from(500 * E18), U256::from(1_000_000_000u64))],
        )),
    ));
    let checker = checker(MockConnector::default().with(&eth));

    let swap = checker.reconstruct(HASH).await.unwrap().swap;
    assert_eq!(swap.state, SwapState::Swap);
    assert_eq!(swap.token_0, detail("Pepe", 18));
    assert_eq!(swap.token_1, detail("Tether USD", 6));

    assert_eq!(swap.original_amount.token_0, "500.0");
    assert_eq!(swap.original_amount.token_1, "1000.0");
    assert_eq!(swap.weth_amount.token_0, "0.5");
    assert_eq!(swap.weth_amount.token_1, "0.5");
    assert_eq!(swap.usdt_amount.token_0, "1000.0");
    assert_eq!(swap.usdt_amount.estimated_fee, "3.0");
}

#[tokio::test]
async fn only_swap_logs_are_summed() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &swap_input(&[WETH, USDT])),
        Some(receipt(
            HASH,
            vec![
                transfer_log(U256::from(E18)),
                swap_log(U256::from(4 * E18 / 10), U256::from(1_500_000u64)),
                swap_log(U256::from(6 * E18 / 10), U256::from(500_000u64)),
            ],
        )),
    ));
    let checker = checker(MockConnector::default().with(&eth));

    let swap = checker.reconstruct(HASH).await.unwrap().swap;
    assert_eq!(swap.original_amount.token_0, "1.0");
    assert_eq!(swap.original_amount.token_1, "2.0");
}

// ─── Degraded enrichment ─────────────────────────────────────────────────────

#[tokio::test]
async fn quote_outage_degrades_to_zero() {
    let eth = Arc::new(buy_chain().with_quote_outage());
    let checker = checker(MockConnector::default().with(&eth));

    let swap = checker.reconstruct(HASH).await.unwrap().swap;
    assert_eq!(swap.state, SwapState::Buy);
    assert_eq!(swap.original_amount.token_1, "2.0");
    assert_eq!(swap.weth_amount.token_0, "1.0");
    assert_eq!(swap.weth_amount.token_1, "0.0");
    assert_eq!(swap.usdt_amount.token_0, "0.0");
    assert_eq!(swap.usdt_amount.token_1, "0.0");
    assert_eq!(swap.usdt_amount.estimated_fee, "0.0");

    // Three quotes, each five historical attempts and one latest attempt.
    let blocks = eth.quote_blocks();
    assert_eq!(blocks.len(), 18);
    let mut per_quote = vec![BlockTag::Number(BLOCK); 5];
    per_quote.push(BlockTag::Latest);
    assert_eq!(&blocks[..6], per_quote.as_slice());
}

#[tokio::test]
async fn quote_policy_bounds_attempts() {
    let eth = Arc::new(buy_chain().with_quote_outage());
    let checker = checker(MockConnector::default().with(&eth)).with_quote_policy(QuotePolicy {
        historical_attempts: 1,
        latest_fallback: false,
    });

    checker.reconstruct(HASH).await.unwrap();
    assert_eq!(eth.quote_blocks().len(), 3);
}

#[tokio::test]
async fn unknown_chain_is_reported_as_unknown() {
    let mut chain = buy_chain();
    chain.chain_id = 999;
    let eth = Arc::new(chain);
    let checker = checker(MockConnector::default().with(&eth));

    let report = checker.reconstruct(HASH).await.unwrap();
    assert_eq!(report.transaction.chain, "unknown");
    assert_eq!(report.swap.state, SwapState::Buy);
}

#[tokio::test]
async fn unknown_router_skips_conversion() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, UNKNOWN_ROUTER, &swap_input(&[WETH, USDT])),
        Some(receipt(
            HASH,
            vec![swap_log(U256::from(E18), U256::from(2_000_000u64))],
        )),
    ));
    let checker = checker(MockConnector::default().with(&eth));

    let report = checker.reconstruct(HASH).await.unwrap();
    assert!(report.transaction.router.is_none());
    let swap = &report.swap;
    assert_eq!(swap.state, SwapState::Swap);
    assert_eq!(swap.token_0, detail("Wrapped Ether", 18));
    assert_eq!(swap.token_1, detail("Tether USD", 6));
    assert_eq!(swap.original_amount.token_0, "1.0");
    assert_eq!(swap.original_amount.token_1, "2.0");
    assert_eq!(swap.original_amount.estimated_fee, "0.0");
    assert_eq!(swap.weth_amount.token_0, "0.0");
    assert_eq!(swap.usdt_amount.token_1, "0.0");
    assert!(eth.quote_blocks().is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["router"], "unknown");
}

// ─── Locating ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn located_on_the_network_that_has_it() {
    let eth = Arc::new(MockChain::new("mock://eth", 1));
    let mut bsc_chain = buy_chain();
    bsc_chain.endpoint = "mock://bsc".into();
    bsc_chain.chain_id = 56;
    let bsc = Arc::new(bsc_chain);
    let checker = checker(MockConnector::default().with(&eth).with(&bsc));

    let report = checker.reconstruct(HASH).await.unwrap();
    assert_eq!(report.transaction.chain, "BNB Smart Chain");
    assert_eq!(checker.pinned().unwrap().endpoint(), "mock://bsc");
    assert_eq!(bsc.receipt_lookups.load(Ordering::SeqCst), 1);
    assert_eq!(eth.receipt_lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pinned_network_is_the_only_one_queried() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(OTHER_HASH, ROUTER, &swap_input(&[WETH, USDT])),
        Some(receipt(OTHER_HASH, vec![])),
    ));
    let mut bsc_chain = buy_chain();
    bsc_chain.endpoint = "mock://bsc".into();
    bsc_chain.chain_id = 56;
    let bsc = Arc::new(bsc_chain);
    let checker = checker(MockConnector::default().with(&eth).with(&bsc));

    checker.reconstruct(HASH).await.unwrap();
    let eth_lookups = eth.tx_lookups();
    assert_eq!(bsc.tx_lookups(), 1);

    // OTHER_HASH exists on eth, but the checker is pinned to bsc now.
    let err = checker.reconstruct(OTHER_HASH).await.unwrap_err();
    assert!(matches!(err, CheckerError::TransactionNotFound { .. }));
    assert_eq!(eth.tx_lookups(), eth_lookups);
    assert_eq!(bsc.tx_lookups(), 2);
}

#[tokio::test]
async fn undecodable_input_counts_as_a_miss() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, "0xdeadbeef"),
        Some(receipt(HASH, vec![])),
    ));
    let mut bsc_chain = buy_chain();
    bsc_chain.endpoint = "mock://bsc".into();
    bsc_chain.chain_id = 56;
    let bsc = Arc::new(bsc_chain);
    let checker = checker(MockConnector::default().with(&eth).with(&bsc));

    let report = checker.reconstruct(HASH).await.unwrap();
    assert_eq!(report.transaction.chain, "BNB Smart Chain");
}

#[tokio::test]
async fn explicit_rpc_skips_the_registry() {
    let eth = Arc::new(MockChain::new("mock://eth", 1));
    let mut bsc_chain = buy_chain();
    bsc_chain.endpoint = "mock://bsc".into();
    let bsc = Arc::new(bsc_chain);
    let checker = checker(MockConnector::default().with(&eth).with(&bsc)).with_rpc("mock://eth");

    let err = checker.reconstruct(HASH).await.unwrap_err();
    assert!(matches!(err, CheckerError::TransactionNotFound { .. }));
    assert_eq!(bsc.tx_lookups(), 0);
    assert_eq!(eth.tx_lookups(), 1);
}

#[tokio::test]
async fn unreachable_explicit_rpc_is_a_transport_error() {
    let checker = checker(MockConnector::default()).with_rpc("mock://nowhere");
    let err = checker.reconstruct(HASH).await.unwrap_err();
    assert!(matches!(err, CheckerError::Transport(TransportError::Http(_))));
}

#[tokio::test]
async fn missing_everywhere_is_not_found() {
    let eth = Arc::new(MockChain::new("mock://eth", 1));
    // bsc is registered but unreachable
    let checker = checker(MockConnector::default().with(&eth));

    let err = checker.reconstruct(HASH).await.unwrap_err();
    assert!(matches!(err, CheckerError::TransactionNotFound { hash } if hash == HASH));
}

#[tokio::test]
async fn empty_node_registry_is_an_error() {
    let checker = SwapChecker::new(
        NodeRegistry::from_json("{}").unwrap(),
        routers(),
        Arc::new(MockConnector::default()),
    )
    .unwrap();
    assert!(matches!(
        checker.reconstruct(HASH).await,
        Err(CheckerError::NoNetworks)
    ));
}

// ─── Structural failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn missing_receipt_is_fatal() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &swap_input(&[WETH, USDT])),
        None,
    ));
    let checker = checker(MockConnector::default().with(&eth));

    let err = checker.reconstruct(HASH).await.unwrap_err();
    assert!(matches!(err, CheckerError::ReceiptNotFound { .. }));
}

#[tokio::test]
async fn call_without_path_is_unsupported() {
    let router = ContractInterface::from_abi_json(ROUTER_ABI).unwrap();
    let data = router
        .encode_call(
            "addLiquidity",
            &[
                AbiValue::Address(addr(WETH)),
                AbiValue::Address(addr(USDT)),
                AbiValue::Uint(U256::from(E18)),
                AbiValue::Uint(U256::from(2_000_000_000u64)),
                AbiValue::Uint(U256::ZERO),
                AbiValue::Uint(U256::ZERO),
                AbiValue::Address(addr(RECIPIENT)),
                AbiValue::Uint(U256::from(1_700_000_000u64)),
            ],
        )
        .unwrap();
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &format!("0x{}", hex::encode(data))),
        Some(receipt(HASH, vec![])),
    ));
    let checker = checker(MockConnector::default().with(&eth));

    let err = checker.reconstruct(HASH).await.unwrap_err();
    assert!(matches!(err, CheckerError::UnsupportedSwapMethod { method } if method == "addLiquidity"));
    assert_eq!(eth.receipt_lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_path_is_unsupported() {
    let eth = Arc::new(MockChain::new("mock://eth", 1).with_tx(
        transaction(HASH, ROUTER, &swap_input(&[])),
        Some(receipt(HASH, vec![])),
    ));
    let checker = checker(MockConnector::default().with(&eth));

    assert!(matches!(
        checker.reconstruct(HASH).await,
        Err(CheckerError::UnsupportedSwapMethod { .. })
    ));
}

// ─── Output shape ────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_serializes_with_transaction_fields_flattened() {
    let eth = Arc::new(buy_chain());
    let checker = checker(MockConnector::default().with(&eth));

    let report: SwapReport = checker.reconstruct(HASH).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["hash"], HASH);
    assert_eq!(json["nonce"], "0x7");
    assert_eq!(json["chain"], "Ethereum");
    assert_eq!(json["decoded_input"]["name"], "swapExactTokensForTokens");
    assert_eq!(json["decoded_input"]["params"][2]["name"], "path");
    assert_eq!(json["decoded_input"]["params"][2]["value"][0], WETH);
    assert_eq!(json["router"]["weth_address"].as_str().map(str::to_lowercase).as_deref(), Some(WETH));
    assert_eq!(json["router"]["swap_fee"], "0.003");
    assert_eq!(json["swap"]["state"], "buy");
    assert_eq!(json["swap"]["swap_at_block"], BLOCK);
    assert_eq!(json["swap"]["token_1"]["decimals"], 6);
    assert_eq!(json["swap"]["original_amount"]["token_1"], "2.0");
}
