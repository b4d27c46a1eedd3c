//! Node and router registries.
//!
//! Both are plain JSON documents. Defaults are compiled in from `config/`
//! and can be replaced by files at runtime.
//!
//! ```json
//! // nodes.json
//! { "1": { "name": "Ethereum", "rpc": "https://rpc.ankr.com/eth" } }
//!
//! // routers.json
//! { "0x7a25…488d": { "weth_address": "0xc02a…6cc2", "usdt_address": "0xdac1…1ec7",
//!                    "usdt_decimal": 6, "swap_fee": 0.003 } }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

const BUNDLED_NODES: &str = include_str!("../config/nodes.json");
const BUNDLED_ROUTERS: &str = include_str!("../config/routers.json");

/// A network the checker can search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: String,
    pub rpc: String,
}

#[derive(Deserialize)]
struct NodeEntry {
    name: String,
    rpc: String,
}

/// Chain id → network, iterated in chain id order.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    chains: BTreeMap<u64, ChainInfo>,
}

impl NodeRegistry {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, NodeEntry> =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse {
                what: "node registry",
                source,
            })?;

        let mut chains = BTreeMap::new();
        for (key, entry) in raw {
            let chain_id: u64 = key
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidChainId(key.clone()))?;
            chains.insert(
                chain_id,
                ChainInfo {
                    chain_id,
                    name: entry.name,
                    rpc: entry.rpc.trim().to_string(),
                },
            );
        }
        Ok(Self { chains })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read(path.as_ref())?)
    }

    /// The registry compiled into the binary.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED_NODES)
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainInfo> {
        self.chains.get(&chain_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainInfo> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// `swap_fee` as an exact decimal, from a JSON number (plain or exponent
/// form) or a string. Negative rates are rejected.
fn deserialize_fee<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }
    let text = match Raw::deserialize(d)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s.trim().to_string(),
    };
    let fee = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| de::Error::custom(ConfigError::InvalidFee(text.clone())))?;
    if fee.is_sign_negative() {
        return Err(de::Error::custom(ConfigError::InvalidFee(text)));
    }
    Ok(fee.normalize())
}

/// A DEX router and the assets its amounts are normalised to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterInfo {
    pub address: Address,
    /// Wrapped native asset (WETH, WBNB, ...).
    #[serde(rename = "weth_address")]
    pub base_asset: Address,
    /// Stable-value asset (USDT).
    #[serde(rename = "usdt_address")]
    pub stable_asset: Address,
    #[serde(rename = "usdt_decimal")]
    pub stable_decimals: u8,
    pub swap_fee: Decimal,
}

#[derive(Deserialize)]
struct RouterEntry {
    weth_address: String,
    usdt_address: String,
    usdt_decimal: u8,
    #[serde(deserialize_with = "deserialize_fee")]
    swap_fee: Decimal,
}

/// Lowercase router address → router.
#[derive(Debug, Clone, Default)]
pub struct RouterRegistry {
    routers: HashMap<String, RouterInfo>,
}

impl RouterRegistry {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, RouterEntry> =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse {
                what: "router registry",
                source,
            })?;

        let mut routers = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let info = RouterInfo {
                address: parse_address(&key)?,
                base_asset: parse_address(&entry.weth_address)?,
                stable_asset: parse_address(&entry.usdt_address)?,
                stable_decimals: entry.usdt_decimal,
                swap_fee: entry.swap_fee,
            };
            routers.insert(key.trim().to_ascii_lowercase(), info);
        }
        Ok(Self { routers })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read(path.as_ref())?)
    }

    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED_ROUTERS)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, address: &str) -> Option<&RouterInfo> {
        self.routers.get(&address.trim().to_ascii_lowercase())
    }

    /// Routers sorted by address.
    pub fn iter(&self) -> impl Iterator<Item = &RouterInfo> {
        let mut all: Vec<&RouterInfo> = self.routers.values().collect();
        all.sort_by_key(|r| r.address);
        all.into_iter()
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

fn parse_address(raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(raw.to_string()))
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
