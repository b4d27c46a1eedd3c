//! The structures a reconstruction produces.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use swapcheck_abi::DecodedMethod;
use swapcheck_rpc::Transaction;

use crate::config::RouterInfo;
use crate::units::{fee_amount, format_units};

/// A located transaction with its decoded router call and context.
///
/// Serializes as the node's transaction fields plus `decoded_input`,
/// `chain` and `router` (`"unknown"` when the router is not registered).
#[derive(Debug, Clone, Serialize)]
pub struct DecodedTransaction {
    #[serde(flatten)]
    pub raw: Transaction,
    pub decoded_input: DecodedMethod,
    pub chain: String,
    #[serde(serialize_with = "router_or_unknown")]
    pub router: Option<RouterInfo>,
}

fn router_or_unknown<S: Serializer>(router: &Option<RouterInfo>, s: S) -> Result<S::Ok, S::Error> {
    match router {
        Some(info) => info.serialize(s),
        None => s.serialize_str("unknown"),
    }
}

/// Direction of a swap relative to the router's base asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapState {
    /// Base asset in, token out.
    Buy,
    /// Token in, base asset out.
    Sell,
    /// Neither endpoint is the base asset.
    Swap,
}

impl std::fmt::Display for SwapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Swap => "swap",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDetail {
    pub name: String,
    pub decimals: u8,
}

/// One view of the two legs, formatted, plus the fee on the in leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapAmounts {
    pub token_0: String,
    pub token_1: String,
    pub estimated_fee: String,
}

impl SwapAmounts {
    /// Format raw leg amounts; the fee is `amount_in × fee` at the in leg's
    /// precision.
    pub fn format(
        amount_in: U256,
        decimals_in: u32,
        amount_out: U256,
        decimals_out: u32,
        fee: Decimal,
    ) -> Self {
        Self {
            token_0: format_units(amount_in, decimals_in),
            token_1: format_units(amount_out, decimals_out),
            estimated_fee: fee_amount(amount_in, decimals_in, fee),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapSummary {
    pub swap_at_block: Option<u64>,
    pub recipient: String,
    pub token_0: TokenDetail,
    pub token_1: TokenDetail,
    pub state: SwapState,
    /// In token units.
    pub original_amount: SwapAmounts,
    /// In base-asset units.
    pub weth_amount: SwapAmounts,
    /// In stable-asset units.
    pub usdt_amount: SwapAmounts,
}

/// Final output of [`SwapChecker::reconstruct`](crate::SwapChecker::reconstruct).
#[derive(Debug, Clone, Serialize)]
pub struct SwapReport {
    #[serde(flatten)]
    pub transaction: DecodedTransaction,
    pub swap: SwapSummary,
}
