//! ABIs compiled into the crate.

use crate::fingerprint;

/// UniswapV2Router02-compatible router ABI.
pub const ROUTER_ABI: &str = include_str!("../abi/router.json");

/// UniswapV2Pair-compatible pair ABI.
pub const PAIR_ABI: &str = include_str!("../abi/pair.json");

/// ERC-20 token ABI.
pub const ERC20_ABI: &str = include_str!("../abi/erc20.json");

/// Canonical signature of the pair `Swap` event.
pub const SWAP_EVENT_SIGNATURE: &str = "Swap(address,uint256,uint256,uint256,uint256,address)";

/// topic0 of the pair `Swap` event.
pub fn swap_topic() -> String {
    fingerprint::keccak256_signature(SWAP_EVENT_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AbiDecoder;

    #[test]
    fn bundled_abis_parse() {
        let decoder = AbiDecoder::new()
            .with_abi_json(ROUTER_ABI)
            .and_then(|d| d.with_abi_json(PAIR_ABI))
            .and_then(|d| d.with_abi_json(ERC20_ABI))
            .unwrap();
        assert_eq!(decoder.event_topic("Swap").map(str::to_string), Some(swap_topic()));
    }
}
