//! `SwapChecker`: reconstructs a DEX swap from a transaction hash.
//!
//! # Pipeline
//! 1. locate the transaction and decode its router call
//! 2. read `path` / `to` from the call, sum the pair `Swap` logs of the receipt
//! 3. classify buy / sell / swap against the router's base asset
//! 4. convert legs to base-asset and stable-asset terms via `getAmountsOut`
//! 5. format every view at its own precision and attach fee estimates
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use swapcheck_core::{NodeRegistry, RouterRegistry, SwapChecker};
//! use swapcheck_rpc::RpcConnector;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let checker = SwapChecker::new(
//!     NodeRegistry::bundled()?,
//!     RouterRegistry::bundled()?,
//!     Arc::new(RpcConnector::default()),
//! )?;
//! let report = checker
//!     .reconstruct("0x2b1d2c9c20535c51404000b3414280854136ef55c21e60ddab226f18e15e9a76")
//!     .await?;
//! println!("{} on {}", report.swap.state, report.transaction.chain);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use swapcheck_abi::{swap_topic, AbiDecoder, AbiValue, ContractInterface};
use swapcheck_abi::{ERC20_ABI, PAIR_ABI, ROUTER_ABI};
use swapcheck_rpc::{BlockTag, Connector, EthClient, TransactionReceipt};
use tokio::sync::OnceCell;

use crate::config::{NodeRegistry, RouterInfo, RouterRegistry};
use crate::error::CheckerError;
use crate::locator::{LocatedTransaction, TransactionLocator};
use crate::quote::{PriceQuoter, QuotePolicy};
use crate::report::{SwapAmounts, SwapReport, SwapState, SwapSummary, TokenDetail};
use crate::token::TokenResolver;

const BASE_DECIMALS: u8 = 18;

/// Reconstructs swaps. Holds the registries, the ABIs and a lazily pinned
/// connection: once a transaction has been found on a network, later calls
/// on the same checker only query that network.
pub struct SwapChecker {
    nodes: NodeRegistry,
    routers: RouterRegistry,
    connector: Arc<dyn Connector>,
    decoder: AbiDecoder,
    router_abi: ContractInterface,
    erc20_abi: ContractInterface,
    swap_topic: String,
    quote_policy: QuotePolicy,
    rpc: Option<String>,
    pinned: OnceCell<Arc<dyn EthClient>>,
}

impl SwapChecker {
    pub fn new(
        nodes: NodeRegistry,
        routers: RouterRegistry,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, CheckerError> {
        let decoder = AbiDecoder::new()
            .with_abi_json(ROUTER_ABI)?
            .with_abi_json(PAIR_ABI)?;
        Ok(Self {
            nodes,
            routers,
            connector,
            decoder,
            router_abi: ContractInterface::from_abi_json(ROUTER_ABI)?,
            erc20_abi: ContractInterface::from_abi_json(ERC20_ABI)?,
            swap_topic: swap_topic(),
            quote_policy: QuotePolicy::default(),
            rpc: None,
            pinned: OnceCell::new(),
        })
    }

    /// Search only `endpoint` instead of racing the node registry.
    pub fn with_rpc(mut self, endpoint: impl Into<String>) -> Self {
        self.rpc = Some(endpoint.into());
        self
    }

    pub fn with_quote_policy(mut self, policy: QuotePolicy) -> Self {
        self.quote_policy = policy;
        self
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn routers(&self) -> &RouterRegistry {
        &self.routers
    }

    /// The connection transactions are looked up on, once one is known.
    pub fn pinned(&self) -> Option<&Arc<dyn EthClient>> {
        self.pinned.get()
    }

    /// Find `hash` and decode its router call, pinning the winning network.
    pub async fn locate(&self, hash: &str) -> Result<LocatedTransaction, CheckerError> {
        let hash = hash.trim();
        let pinned = match &self.rpc {
            Some(endpoint) => Some(
                self.pinned
                    .get_or_try_init(|| self.connector.connect(endpoint))
                    .await?
                    .clone(),
            ),
            None => self.pinned.get().cloned(),
        };

        let locator =
            TransactionLocator::new(&self.nodes, &self.routers, &self.decoder, &*self.connector);
        let located = locator.locate(hash, pinned).await?;
        // First success pins; later winners cannot replace it.
        let _ = self.pinned.set(located.client.clone());
        Ok(located)
    }

    /// Rebuild the swap carried by transaction `hash`.
    pub async fn reconstruct(&self, hash: &str) -> Result<SwapReport, CheckerError> {
        let hash = hash.trim();
        let LocatedTransaction {
            transaction,
            client,
        } = self.locate(hash).await?;

        let method = &transaction.decoded_input;
        let path = method
            .param("path")
            .and_then(AbiValue::as_address_array)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CheckerError::UnsupportedSwapMethod {
                method: method.name.clone(),
            })?;
        let recipient = method
            .param("to")
            .and_then(AbiValue::as_address)
            .map(|a| format!("{a:#x}"))
            .unwrap_or_default();

        let receipt = client
            .transaction_receipt(hash)
            .await?
            .ok_or_else(|| CheckerError::ReceiptNotFound {
                hash: hash.to_string(),
            })?;
        if receipt.succeeded() == Some(false) {
            tracing::warn!(%hash, "transaction reverted; no Swap logs expected");
        }
        let (swap_in, swap_out) = self.sum_swap_logs(&receipt);
        tracing::debug!(%hash, %swap_in, %swap_out, logs = receipt.logs.len(), "swap legs summed");

        let block_number = transaction.raw.block_number_u64();
        let block = block_number.map_or(BlockTag::Latest, BlockTag::Number);
        let legs = Legs {
            first: path[0],
            last: path[path.len() - 1],
            swap_in,
            swap_out,
            block,
        };

        let client = client.as_ref();
        let swap = match &transaction.router {
            Some(router) => self.price_legs(client, router, &legs).await,
            None => self.unpriced_legs(client, &legs).await,
        };
        tracing::info!(%hash, state = %swap.state, chain = %transaction.chain, "swap reconstructed");

        Ok(SwapReport {
            transaction,
            swap: SwapSummary {
                swap_at_block: block_number,
                recipient,
                token_0: swap.token_0,
                token_1: swap.token_1,
                state: swap.state,
                original_amount: swap.original_amount,
                weth_amount: swap.weth_amount,
                usdt_amount: swap.usdt_amount,
            },
        })
    }

    /// `(Σ amount0In, Σ amount1Out)` over the pair `Swap` logs.
    fn sum_swap_logs(&self, receipt: &TransactionReceipt) -> (U256, U256) {
        let mut swap_in = U256::ZERO;
        let mut swap_out = U256::ZERO;

        let swap_logs = receipt.logs.iter().filter(|log| {
            log.topics
                .first()
                .is_some_and(|t| t.eq_ignore_ascii_case(&self.swap_topic))
        });
        for log in swap_logs {
            let decoded = log
                .data_bytes()
                .ok()
                .and_then(|data| self.decoder.decode_log(&log.topics, &data));
            let Some(decoded) = decoded else {
                tracing::warn!(pair = %log.address, "undecodable Swap log skipped");
                continue;
            };
            if let Some(v) = decoded.param("amount0In").and_then(AbiValue::as_uint) {
                swap_in = swap_in.saturating_add(v);
            }
            if let Some(v) = decoded.param("amount1Out").and_then(AbiValue::as_uint) {
                swap_out = swap_out.saturating_add(v);
            }
        }
        (swap_in, swap_out)
    }

    async fn price_legs(
        &self,
        client: &dyn EthClient,
        router: &RouterInfo,
        legs: &Legs,
    ) -> PricedSwap {
        let quoter = PriceQuoter::new(client, router.address, &self.router_abi, &self.quote_policy);
        let tokens = TokenResolver::new(client, &self.erc20_abi);
        let base = router.base_asset;

        let (state, base_in, base_out, token_0, token_1) = if legs.first == base {
            let base_out = quoter
                .quote_or_zero(legs.last, base, legs.swap_out, legs.block)
                .await;
            let token_1 = tokens.detail(legs.last).await;
            let token_0 = self.base_detail(&tokens, base).await;
            (SwapState::Buy, legs.swap_in, base_out, token_0, token_1)
        } else if legs.last == base {
            let base_in = quoter
                .quote_or_zero(legs.first, base, legs.swap_in, legs.block)
                .await;
            let token_0 = tokens.detail(legs.first).await;
            let token_1 = self.base_detail(&tokens, base).await;
            (SwapState::Sell, base_in, legs.swap_out, token_0, token_1)
        } else {
            let base_out = quoter
                .quote_or_zero(legs.last, base, legs.swap_out, legs.block)
                .await;
            let base_in = quoter
                .quote_or_zero(legs.first, base, legs.swap_in, legs.block)
                .await;
            let token_0 = tokens.detail(legs.first).await;
            let token_1 = tokens.detail(legs.last).await;
            (SwapState::Swap, base_in, base_out, token_0, token_1)
        };

        let stable_in = quoter
            .quote_or_zero(base, router.stable_asset, base_in, legs.block)
            .await;
        let stable_out = quoter
            .quote_or_zero(base, router.stable_asset, base_out, legs.block)
            .await;

        let fee = router.swap_fee;
        let stable_decimals = u32::from(router.stable_decimals);
        PricedSwap {
            state,
            original_amount: SwapAmounts::format(
                legs.swap_in,
                u32::from(token_0.decimals),
                legs.swap_out,
                u32::from(token_1.decimals),
                fee,
            ),
            weth_amount: SwapAmounts::format(
                base_in,
                u32::from(BASE_DECIMALS),
                base_out,
                u32::from(BASE_DECIMALS),
                fee,
            ),
            usdt_amount: SwapAmounts::format(
                stable_in,
                stable_decimals,
                stable_out,
                stable_decimals,
                fee,
            ),
            token_0,
            token_1,
        }
    }

    /// Unregistered router: nothing to price against.
    async fn unpriced_legs(&self, client: &dyn EthClient, legs: &Legs) -> PricedSwap {
        let tokens = TokenResolver::new(client, &self.erc20_abi);
        let token_0 = tokens.detail(legs.first).await;
        let token_1 = tokens.detail(legs.last).await;
        let zero = SwapAmounts::format(
            U256::ZERO,
            u32::from(BASE_DECIMALS),
            U256::ZERO,
            u32::from(BASE_DECIMALS),
            Decimal::ZERO,
        );
        PricedSwap {
            state: SwapState::Swap,
            original_amount: SwapAmounts::format(
                legs.swap_in,
                u32::from(token_0.decimals),
                legs.swap_out,
                u32::from(token_1.decimals),
                Decimal::ZERO,
            ),
            weth_amount: zero.clone(),
            usdt_amount: zero,
            token_0,
            token_1,
        }
    }

    /// Metadata for the leg already denominated in the base asset.
    async fn base_detail(&self, tokens: &TokenResolver<'_>, base: Address) -> TokenDetail {
        let name = tokens.name(base).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "base asset name defaulted");
            crate::token::UNKNOWN_NAME.to_string()
        });
        TokenDetail {
            name,
            decimals: BASE_DECIMALS,
        }
    }
}

struct Legs {
    first: Address,
    last: Address,
    swap_in: U256,
    swap_out: U256,
    block: BlockTag,
}

struct PricedSwap {
    state: SwapState,
    token_0: TokenDetail,
    token_1: TokenDetail,
    original_amount: SwapAmounts,
    weth_amount: SwapAmounts,
    usdt_amount: SwapAmounts,
}
