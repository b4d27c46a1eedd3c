//! ERC-20 name and decimals lookup.

use alloy_primitives::Address;
use swapcheck_abi::{AbiValue, ContractInterface};
use swapcheck_rpc::{BlockTag, EthClient};

use crate::error::EnrichmentError;
use crate::report::TokenDetail;

pub const UNKNOWN_NAME: &str = "unknown";
pub const DEFAULT_DECIMALS: u8 = 18;

/// Token metadata handle over one connection. The ERC-20 interface is
/// unbound; the token address is supplied per call.
pub struct TokenResolver<'a> {
    client: &'a dyn EthClient,
    erc20: &'a ContractInterface,
}

impl<'a> TokenResolver<'a> {
    pub fn new(client: &'a dyn EthClient, erc20: &'a ContractInterface) -> Self {
        Self { client, erc20 }
    }

    /// `name()`. Legacy tokens returning `bytes32` are decoded too.
    pub async fn name(&self, token: Address) -> Result<String, EnrichmentError> {
        let raw = self.read(token, "name").await?;
        match self.erc20.decode_output("name", &raw) {
            Ok(out) => out
                .first()
                .and_then(AbiValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| unavailable(token, "name", "empty output")),
            Err(e) => bytes32_name(&raw).ok_or_else(|| unavailable(token, "name", e)),
        }
    }

    /// `decimals()`.
    pub async fn decimals(&self, token: Address) -> Result<u8, EnrichmentError> {
        let raw = self.read(token, "decimals").await?;
        let out = self
            .erc20
            .decode_output("decimals", &raw)
            .map_err(|e| unavailable(token, "decimals", e))?;
        out.first()
            .and_then(AbiValue::as_uint)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| unavailable(token, "decimals", "out of range"))
    }

    /// Name and decimals, each defaulted independently.
    pub async fn detail(&self, token: Address) -> TokenDetail {
        let name = self.name(token).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "token name defaulted");
            UNKNOWN_NAME.to_string()
        });
        let decimals = self.decimals(token).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "token decimals defaulted");
            DEFAULT_DECIMALS
        });
        TokenDetail { name, decimals }
    }

    async fn read(&self, token: Address, function: &'static str) -> Result<Vec<u8>, EnrichmentError> {
        let data = self
            .erc20
            .encode_call(function, &[])
            .map_err(|e| unavailable(token, function, e))?;
        self.client
            .call(token, &data, BlockTag::Latest)
            .await
            .map_err(|e| unavailable(token, function, e))
    }
}

fn unavailable(token: Address, field: &'static str, reason: impl ToString) -> EnrichmentError {
    EnrichmentError::TokenMetadataUnavailable {
        token: format!("{token:#x}"),
        field,
        reason: reason.to_string(),
    }
}

/// A `bytes32` name padded with trailing NULs.
fn bytes32_name(raw: &[u8]) -> Option<String> {
    if raw.len() != 32 {
        return None;
    }
    let end = raw.iter().rposition(|b| *b != 0)? + 1;
    String::from_utf8(raw[..end].to_vec()).ok()
}
