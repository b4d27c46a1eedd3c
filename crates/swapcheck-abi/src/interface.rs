//! Call encoding and return decoding for a single contract ABI.
//!
//! The inverse direction of [`AbiDecoder`](crate::AbiDecoder): given a
//! function name and [`AbiValue`] arguments, build `eth_call` calldata, then
//! decode the bytes the node returns.
//!
//! # Usage
//! ```ignore
//! let router = ContractInterface::from_abi_json(ROUTER_ABI)?;
//! let data = router.encode_call("getAmountsOut", &[
//!     AbiValue::Uint(amount_in),
//!     AbiValue::Array(vec![AbiValue::Address(weth), AbiValue::Address(usdt)]),
//! ])?;
//! ```

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{Function, JsonAbi};

use crate::decoder::decode_params;
use crate::error::AbiError;
use crate::value::{normalize, to_dyn_value, AbiValue};

/// Encoder/decoder bound to one contract ABI.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    abi: JsonAbi,
}

impl ContractInterface {
    pub fn from_abi_json(abi_json: &str) -> Result<Self, AbiError> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| AbiError::InvalidAbi(e.to_string()))?;
        Ok(Self { abi })
    }

    /// 4-byte selector of a named function.
    pub fn selector(&self, name: &str) -> Option<[u8; 4]> {
        self.abi
            .functions()
            .find(|f| f.name == name)
            .map(|f| f.selector().0)
    }

    /// Encode `selector ++ abi_encode_params(args)`.
    ///
    /// `args` are in declaration order; overloads are resolved by arity.
    pub fn encode_call(&self, name: &str, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let func = self.function(name, Some(args.len()))?;

        let mut dyn_values = Vec::with_capacity(args.len());
        for (i, (param, arg)) in func.inputs.iter().zip(args).enumerate() {
            let param_label = if param.name.is_empty() {
                format!("arg{i}")
            } else {
                param.name.clone()
            };
            let ty = param.resolve().map_err(|e| AbiError::Encode {
                param: param_label.clone(),
                reason: e.to_string(),
            })?;
            let value = to_dyn_value(arg, &ty).map_err(|reason| AbiError::Encode {
                param: param_label,
                reason,
            })?;
            dyn_values.push(value);
        }

        let mut calldata = func.selector().to_vec();
        calldata.extend_from_slice(&DynSolValue::Tuple(dyn_values).abi_encode_params());
        Ok(calldata)
    }

    /// Decode the return data of a named function into its outputs.
    ///
    /// Empty return data (a call to an address without code) is a decode
    /// error unless the function has no outputs.
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let func = self.function(name, None)?;
        let types: Vec<DynSolType> = func
            .outputs
            .iter()
            .map(|p| p.resolve())
            .collect::<Result<_, _>>()
            .map_err(|e| AbiError::Decode(e.to_string()))?;

        decode_params(&types, data)
            .map(|vals| vals.into_iter().map(normalize).collect())
            .ok_or_else(|| {
                AbiError::Decode(format!("{name}: {} bytes do not match outputs", data.len()))
            })
    }

    fn function(&self, name: &str, arity: Option<usize>) -> Result<&Function, AbiError> {
        let mut candidates = self.abi.functions().filter(|f| f.name == name).peekable();
        if candidates.peek().is_none() {
            return Err(AbiError::FunctionNotFound {
                name: name.to_string(),
            });
        }
        let Some(arity) = arity else {
            return candidates.next().ok_or_else(|| AbiError::FunctionNotFound {
                name: name.to_string(),
            });
        };

        let mut expected = 0;
        for func in candidates {
            if func.inputs.len() == arity {
                return Ok(func);
            }
            expected = func.inputs.len();
        }
        Err(AbiError::ArgumentCount {
            name: name.to_string(),
            expected,
            got: arity,
        })
    }
}
