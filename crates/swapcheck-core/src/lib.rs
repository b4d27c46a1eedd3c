//! swapcheck-core: reconstructs DEX router swaps from a transaction hash.
//!
//! # Overview
//!
//! - [`NodeRegistry`] / [`RouterRegistry`]: static network and router data
//! - [`TransactionLocator`]: races registered networks for the transaction
//! - [`PriceQuoter`]: `getAmountsOut` conversion with bounded retry
//! - [`TokenResolver`]: ERC-20 name/decimals with safe defaults
//! - [`SwapChecker`]: the orchestrator producing a [`SwapReport`]

pub mod checker;
pub mod config;
pub mod error;
pub mod locator;
pub mod quote;
pub mod report;
pub mod token;
pub mod units;

#[cfg(test)]
mod testing;

pub use checker::SwapChecker;
pub use config::{ChainInfo, NodeRegistry, RouterInfo, RouterRegistry};
pub use error::{CheckerError, ConfigError, EnrichmentError};
pub use locator::{LocatedTransaction, TransactionLocator, UNKNOWN_CHAIN};
pub use quote::{PriceQuoter, QuotePolicy};
pub use report::{DecodedTransaction, SwapAmounts, SwapReport, SwapState, SwapSummary, TokenDetail};
pub use token::TokenResolver;
pub use units::{fee_amount, format_units};

pub use rust_decimal::Decimal;
