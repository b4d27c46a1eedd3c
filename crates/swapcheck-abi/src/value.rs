//! Decoded ABI values.
//!
//! [`AbiValue`] is what callers see instead of alloy's `DynSolValue`: integers
//! keep full 256-bit precision, addresses stay typed, and the JSON form is the
//! familiar one (decimal strings for numbers, lowercase hex for addresses and
//! bytes).

use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, FixedBytes, I256, U256};
use serde::{Serialize, Serializer};

/// A single decoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// `address[]` as a vector; `None` if any element is not an address.
    pub fn as_address_array(&self) -> Option<Vec<Address>> {
        match self {
            Self::Array(items) => items.iter().map(Self::as_address).collect(),
            _ => None,
        }
    }

    /// `uint256[]` as a vector; `None` if any element is not a uint.
    pub fn as_uint_array(&self) -> Option<Vec<U256>> {
        match self {
            Self::Array(items) => items.iter().map(Self::as_uint).collect(),
            _ => None,
        }
    }
}

impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => s.serialize_bool(*b),
            Self::Uint(u) => s.serialize_str(&u.to_string()),
            Self::Int(i) => s.serialize_str(&i.to_string()),
            Self::Address(a) => s.serialize_str(&format!("{a:#x}")),
            Self::Bytes(b) => s.serialize_str(&format!("0x{}", hex::encode(b))),
            Self::Str(v) => s.serialize_str(v),
            Self::Array(items) | Self::Tuple(items) => s.collect_seq(items),
        }
    }
}

/// Convert a decoded `DynSolValue` into an [`AbiValue`].
pub fn normalize(val: DynSolValue) -> AbiValue {
    match val {
        DynSolValue::Bool(b) => AbiValue::Bool(b),
        DynSolValue::Int(i, _) => AbiValue::Int(i),
        DynSolValue::Uint(u, _) => AbiValue::Uint(u),
        DynSolValue::FixedBytes(word, size) => AbiValue::Bytes(word[..size].to_vec()),
        DynSolValue::Bytes(b) => AbiValue::Bytes(b),
        DynSolValue::String(s) => AbiValue::Str(s),
        DynSolValue::Address(a) => AbiValue::Address(a),
        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            AbiValue::Array(vals.into_iter().map(normalize).collect())
        }
        DynSolValue::Tuple(fields) => AbiValue::Tuple(fields.into_iter().map(normalize).collect()),
        DynSolValue::Function(f) => AbiValue::Bytes(f.to_vec()),
        #[allow(unreachable_patterns)]
        other => AbiValue::Str(format!("{other:?}")),
    }
}

/// Convert an [`AbiValue`] to the alloy `DynSolValue` for the expected type.
pub fn to_dyn_value(val: &AbiValue, expected: &DynSolType) -> Result<DynSolValue, String> {
    match (val, expected) {
        (AbiValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),

        (AbiValue::Uint(u), DynSolType::Uint(bits)) => Ok(DynSolValue::Uint(*u, *bits)),
        (AbiValue::Str(s), DynSolType::Uint(bits)) => {
            let u = U256::from_str(s).map_err(|e| format!("uint parse: {e}"))?;
            Ok(DynSolValue::Uint(u, *bits))
        }

        (AbiValue::Int(i), DynSolType::Int(bits)) => Ok(DynSolValue::Int(*i, *bits)),

        (AbiValue::Address(a), DynSolType::Address) => Ok(DynSolValue::Address(*a)),
        (AbiValue::Str(s), DynSolType::Address) => {
            let addr = Address::from_str(s).map_err(|e| format!("address parse: {e}"))?;
            Ok(DynSolValue::Address(addr))
        }

        (AbiValue::Bytes(b), DynSolType::Bytes) => Ok(DynSolValue::Bytes(b.clone())),
        (AbiValue::Bytes(b), DynSolType::FixedBytes(n)) => {
            if b.len() > *n {
                return Err(format!("bytes{n}: got {} bytes", b.len()));
            }
            let mut word = [0u8; 32];
            word[..b.len()].copy_from_slice(b);
            Ok(DynSolValue::FixedBytes(FixedBytes::from(word), *n))
        }

        (AbiValue::Str(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),

        (AbiValue::Array(elems), DynSolType::Array(inner)) => {
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::Array(dyn_elems?))
        }
        (AbiValue::Array(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::FixedArray(dyn_elems?))
        }

        (AbiValue::Tuple(fields), DynSolType::Tuple(types)) if fields.len() == types.len() => {
            let dyn_elems: Result<Vec<_>, _> = fields
                .iter()
                .zip(types.iter())
                .map(|(v, t)| to_dyn_value(v, t))
                .collect();
            Ok(DynSolValue::Tuple(dyn_elems?))
        }

        _ => Err(format!("cannot convert {val:?} to {expected:?}")),
    }
}
