//! Event topic computation.
//!
//! An event's topic0 is the keccak256 hash of its canonical signature, e.g.
//!   keccak256("Swap(address,uint256,uint256,uint256,uint256,address)")
//!   → 0xd78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822
//!
//! Topics are handled as lowercase `0x`-prefixed hex so they compare equal
//! to what nodes put in receipts.

use tiny_keccak::{Hasher, Keccak};

/// keccak256 of a canonical signature string, as `0x`-prefixed hex.
pub fn keccak256_signature(signature: &str) -> String {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(signature.as_bytes());
    hasher.finalize(&mut output);
    format!("0x{}", hex::encode(output))
}

/// topic0 of a raw log, normalised to lowercase.
/// Returns `None` if topics is empty or the first topic is not a 32-byte hash.
pub fn from_topics(topics: &[String]) -> Option<String> {
    let first = topics.first()?;
    let hex = first.strip_prefix("0x").unwrap_or(first);
    if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("0x{}", hex.to_ascii_lowercase()))
    } else {
        None
    }
}
