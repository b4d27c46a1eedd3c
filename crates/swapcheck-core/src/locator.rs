//! Finds the network a transaction lives on.
//!
//! With a pinned connection only that network is asked. Otherwise every
//! registered network is queried concurrently and the first one that returns
//! a transaction whose input decodes against the router ABI wins; the other
//! lookups are dropped.

use std::sync::Arc;

use futures::future::{select_ok, BoxFuture, FutureExt};
use swapcheck_abi::AbiDecoder;
use swapcheck_rpc::{Connector, EthClient};

use crate::config::{ChainInfo, NodeRegistry, RouterRegistry};
use crate::error::{CheckerError, EnrichmentError};
use crate::report::DecodedTransaction;

pub const UNKNOWN_CHAIN: &str = "unknown";

/// A decoded transaction together with the connection that found it.
pub struct LocatedTransaction {
    pub transaction: DecodedTransaction,
    pub client: Arc<dyn EthClient>,
}

pub struct TransactionLocator<'a> {
    nodes: &'a NodeRegistry,
    routers: &'a RouterRegistry,
    decoder: &'a AbiDecoder,
    connector: &'a dyn Connector,
}

impl<'a> TransactionLocator<'a> {
    pub fn new(
        nodes: &'a NodeRegistry,
        routers: &'a RouterRegistry,
        decoder: &'a AbiDecoder,
        connector: &'a dyn Connector,
    ) -> Self {
        Self {
            nodes,
            routers,
            decoder,
            connector,
        }
    }

    pub async fn locate(
        &self,
        hash: &str,
        pinned: Option<Arc<dyn EthClient>>,
    ) -> Result<LocatedTransaction, CheckerError> {
        match pinned {
            Some(client) => {
                tracing::debug!(url = %client.endpoint(), %hash, "looking up on pinned network");
                self.locate_on(client, hash).await.map_err(|e| {
                    tracing::debug!(error = %e, "pinned network miss");
                    not_found(hash)
                })
            }
            None => self.race(hash).await,
        }
    }

    async fn race(&self, hash: &str) -> Result<LocatedTransaction, CheckerError> {
        if self.nodes.is_empty() {
            return Err(CheckerError::NoNetworks);
        }

        let lookups: Vec<BoxFuture<'_, Result<LocatedTransaction, CheckerError>>> = self
            .nodes
            .iter()
            .map(|chain| self.locate_via(chain, hash).boxed())
            .collect();

        match select_ok(lookups).await {
            Ok((located, _rest)) => Ok(located),
            Err(_) => Err(not_found(hash)),
        }
    }

    async fn locate_via(
        &self,
        chain: &ChainInfo,
        hash: &str,
    ) -> Result<LocatedTransaction, CheckerError> {
        let result = async {
            let client = self.connector.connect(&chain.rpc).await?;
            self.locate_on(client, hash).await
        }
        .await;
        match &result {
            Ok(_) => tracing::info!(chain = %chain.name, %hash, "transaction located"),
            Err(e) => tracing::debug!(chain = %chain.name, error = %e, "network miss"),
        }
        result
    }

    /// Fetch and decode on one connection. A missing transaction or input
    /// that is not a router call is a miss.
    async fn locate_on(
        &self,
        client: Arc<dyn EthClient>,
        hash: &str,
    ) -> Result<LocatedTransaction, CheckerError> {
        let raw = client
            .transaction_by_hash(hash)
            .await?
            .ok_or_else(|| not_found(hash))?;
        let decoded_input = self
            .decoder
            .decode_method(&raw.input_bytes()?)
            .ok_or_else(|| not_found(hash))?;

        let chain = self.chain_name(client.as_ref()).await;
        let router = match raw.to.as_deref() {
            Some(to) => self.routers.get(to).cloned().or_else(|| {
                let e = EnrichmentError::RouterUnidentified {
                    address: to.to_ascii_lowercase(),
                };
                tracing::warn!(error = %e, "router defaulted to unknown");
                None
            }),
            None => None,
        };

        Ok(LocatedTransaction {
            transaction: DecodedTransaction {
                raw,
                decoded_input,
                chain,
                router,
            },
            client,
        })
    }

    async fn chain_name(&self, client: &dyn EthClient) -> String {
        let lookup = match client.chain_id().await {
            Ok(chain_id) => self
                .nodes
                .get(chain_id)
                .map(|c| c.name.clone())
                .ok_or(EnrichmentError::ChainUnidentified { chain_id }),
            Err(e) => Err(EnrichmentError::ChainIdUnavailable {
                reason: e.to_string(),
            }),
        };
        lookup.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "chain defaulted to unknown");
            UNKNOWN_CHAIN.to_string()
        })
    }
}

fn not_found(hash: &str) -> CheckerError {
    CheckerError::TransactionNotFound {
        hash: hash.to_string(),
    }
}
