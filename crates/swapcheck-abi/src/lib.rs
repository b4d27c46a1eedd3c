//! swapcheck-abi: ABI decoding and encoding for Uniswap-V2-style routers.
//!
//! Wraps alloy-rs's `dyn-abi` for the three contract families the swap
//! checker touches:
//!
//! - the router (`swapExactTokensForTokens`, `getAmountsOut`, ...)
//! - the pair (`Swap`, `Sync`, `Mint`, `Burn` events)
//! - ERC-20 tokens (`name`, `decimals`, ...)
//!
//! [`AbiDecoder`] turns transaction input and receipt logs into named
//! parameters; [`ContractInterface`] builds `eth_call` calldata and decodes
//! the returned bytes.

pub mod bundled;
pub mod decoder;
pub mod error;
pub mod fingerprint;
pub mod interface;
pub mod value;

pub use bundled::{swap_topic, ERC20_ABI, PAIR_ABI, ROUTER_ABI, SWAP_EVENT_SIGNATURE};
pub use decoder::{AbiDecoder, DecodedLog, DecodedMethod, DecodedParam};
pub use error::AbiError;
pub use interface::ContractInterface;
pub use value::AbiValue;
