//! Price conversion through a router's `getAmountsOut`.
//!
//! A quote is read at the transaction's block first, retried a bounded
//! number of times (archive-less nodes often fail historical reads), then
//! once against latest state.

use alloy_primitives::{Address, U256};
use swapcheck_abi::{AbiValue, ContractInterface};
use swapcheck_rpc::{BlockTag, EthClient};

use crate::error::EnrichmentError;

/// Retry policy for quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePolicy {
    /// Attempts at the historical block before falling back.
    pub historical_attempts: u32,
    /// Whether to make one final attempt against latest state.
    pub latest_fallback: bool,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        Self {
            historical_attempts: 5,
            latest_fallback: true,
        }
    }
}

/// Router quote handle bound to one connection.
pub struct PriceQuoter<'a> {
    client: &'a dyn EthClient,
    router: Address,
    interface: &'a ContractInterface,
    policy: &'a QuotePolicy,
}

impl<'a> PriceQuoter<'a> {
    pub fn new(
        client: &'a dyn EthClient,
        router: Address,
        interface: &'a ContractInterface,
        policy: &'a QuotePolicy,
    ) -> Self {
        Self {
            client,
            router,
            interface,
            policy,
        }
    }

    /// How many `to` units `amount` of `from` is worth.
    ///
    /// `from == to` returns `amount` without touching the network.
    pub async fn quote(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        block: BlockTag,
    ) -> Result<U256, EnrichmentError> {
        if from == to {
            return Ok(amount);
        }

        let mut attempts = 0;
        let mut last_error = String::from("no attempts made");

        for _ in 0..self.policy.historical_attempts {
            attempts += 1;
            match self.amounts_out(from, to, amount, block).await {
                Ok(out) => return Ok(out),
                Err(e) => {
                    tracing::debug!(%from, %to, %block, attempt = attempts, error = %e, "quote failed");
                    last_error = e;
                }
            }
        }

        if self.policy.latest_fallback {
            attempts += 1;
            match self.amounts_out(from, to, amount, BlockTag::Latest).await {
                Ok(out) => return Ok(out),
                Err(e) => {
                    tracing::debug!(%from, %to, error = %e, "latest quote failed");
                    last_error = e;
                }
            }
        }

        Err(EnrichmentError::PriceQuoteUnavailable {
            from: format!("{from:#x}"),
            to: format!("{to:#x}"),
            attempts,
            reason: last_error,
        })
    }

    /// [`quote`](Self::quote), degraded to zero on failure.
    pub async fn quote_or_zero(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        block: BlockTag,
    ) -> U256 {
        self.quote(from, to, amount, block)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "price quote unavailable, using zero");
                U256::ZERO
            })
    }

    async fn amounts_out(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        block: BlockTag,
    ) -> Result<U256, String> {
        let data = self
            .interface
            .encode_call(
                "getAmountsOut",
                &[
                    AbiValue::Uint(amount),
                    AbiValue::Array(vec![AbiValue::Address(from), AbiValue::Address(to)]),
                ],
            )
            .map_err(|e| e.to_string())?;
        let raw = self
            .client
            .call(self.router, &data, block)
            .await
            .map_err(|e| e.to_string())?;
        let outputs = self
            .interface
            .decode_output("getAmountsOut", &raw)
            .map_err(|e| e.to_string())?;

        outputs
            .first()
            .and_then(AbiValue::as_uint_array)
            .and_then(|amounts| amounts.last().copied())
            .ok_or_else(|| "empty amounts".to_string())
    }
}
