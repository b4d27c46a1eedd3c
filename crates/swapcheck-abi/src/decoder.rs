//! Calldata and log decoder over any number of loaded ABIs.
//!
//! # How it works
//! - Functions are matched on the first 4 bytes of calldata (the selector);
//!   the remaining bytes are the ABI-encoded inputs.
//! - Events are matched on topic0 = keccak256(signature). Indexed inputs
//!   come from the remaining topics, the others from the log data.
//!
//! Unknown selectors/topics and malformed payloads decode to `None`.

use std::collections::HashMap;

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{Event, Function, JsonAbi};
use serde::Serialize;

use crate::error::AbiError;
use crate::fingerprint;
use crate::value::{normalize, AbiValue};

/// A named, typed parameter of a decoded call or log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedParam {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: AbiValue,
}

/// A decoded function call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMethod {
    pub name: String,
    /// `0x`-prefixed 4-byte selector.
    pub selector: String,
    pub params: Vec<DecodedParam>,
}

impl DecodedMethod {
    /// Look up an input by name.
    pub fn param(&self, name: &str) -> Option<&AbiValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// A decoded event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedLog {
    pub name: String,
    pub params: Vec<DecodedParam>,
}

impl DecodedLog {
    pub fn param(&self, name: &str) -> Option<&AbiValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Decoder holding the functions and events of every ABI added to it.
#[derive(Debug, Default, Clone)]
pub struct AbiDecoder {
    functions: Vec<Function>,
    /// Keyed by lowercase topic0.
    events: HashMap<String, Event>,
}

impl AbiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the functions and events of a standard ABI JSON document.
    ///
    /// Functions whose selector is already known are skipped; anonymous
    /// events have no topic0 and are ignored.
    pub fn add_abi_json(&mut self, abi_json: &str) -> Result<(), AbiError> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| AbiError::InvalidAbi(e.to_string()))?;

        for func in abi.functions() {
            if !self.functions.iter().any(|f| f.selector() == func.selector()) {
                self.functions.push(func.clone());
            }
        }
        for event in abi.events().filter(|e| !e.anonymous) {
            let topic = fingerprint::keccak256_signature(&event.signature());
            self.events.entry(topic).or_insert_with(|| event.clone());
        }
        Ok(())
    }

    /// Builder form of [`add_abi_json`](Self::add_abi_json).
    pub fn with_abi_json(mut self, abi_json: &str) -> Result<Self, AbiError> {
        self.add_abi_json(abi_json)?;
        Ok(self)
    }

    /// topic0 of the named event, if loaded.
    pub fn event_topic(&self, name: &str) -> Option<&str> {
        self.events
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(topic, _)| topic.as_str())
    }

    /// Decode transaction input (selector included).
    pub fn decode_method(&self, calldata: &[u8]) -> Option<DecodedMethod> {
        if calldata.len() < 4 {
            return None;
        }
        let (selector, args) = calldata.split_at(4);
        let func = self
            .functions
            .iter()
            .find(|f| f.selector().as_slice() == selector)?;

        let types: Vec<DynSolType> = func
            .inputs
            .iter()
            .map(|p| p.resolve().ok())
            .collect::<Option<_>>()?;
        let values = decode_params(&types, args)?;

        let params = func
            .inputs
            .iter()
            .enumerate()
            .zip(values)
            .map(|((i, p), value)| DecodedParam {
                name: param_name(&p.name, i),
                kind: p.ty.clone(),
                value: normalize(value),
            })
            .collect();

        Some(DecodedMethod {
            name: func.name.clone(),
            selector: format!("0x{}", hex::encode(selector)),
            params,
        })
    }

    /// Decode a raw log from its topics (topic0 first) and data.
    pub fn decode_log(&self, topics: &[String], data: &[u8]) -> Option<DecodedLog> {
        let topic0 = fingerprint::from_topics(topics)?;
        let event = self.events.get(&topic0)?;

        let indexed = event.inputs.iter().filter(|p| p.indexed).count();
        if topics.len() != indexed + 1 {
            return None;
        }

        let data_types: Vec<DynSolType> = event
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.resolve().ok())
            .collect::<Option<_>>()?;
        let mut data_values = decode_params(&data_types, data)?.into_iter();
        let mut topic_values = topics[1..].iter();

        let mut params = Vec::with_capacity(event.inputs.len());
        for (i, input) in event.inputs.iter().enumerate() {
            let value = if input.indexed {
                let ty = input.resolve().ok()?;
                decode_topic(topic_values.next()?, &ty)?
            } else {
                normalize(data_values.next()?)
            };
            params.push(DecodedParam {
                name: param_name(&input.name, i),
                kind: input.ty.clone(),
                value,
            });
        }

        Some(DecodedLog {
            name: event.name.clone(),
            params,
        })
    }
}

fn param_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("arg{index}")
    } else {
        name.to_string()
    }
}

/// ABI-decode a parameter list; `None` if the bytes do not match the types.
pub(crate) fn decode_params(types: &[DynSolType], data: &[u8]) -> Option<Vec<DynSolValue>> {
    if types.is_empty() {
        return Some(vec![]);
    }
    match DynSolType::Tuple(types.to_vec()).abi_decode_params(data).ok()? {
        DynSolValue::Tuple(vals) => Some(vals),
        other => Some(vec![other]),
    }
}

/// Decode one indexed topic.
///
/// Reference types (string, bytes, arrays, tuples) are stored as the hash
/// of their encoding, so the raw 32 bytes are returned instead.
fn decode_topic(topic_hex: &str, ty: &DynSolType) -> Option<AbiValue> {
    let bytes = hex::decode(topic_hex.strip_prefix("0x").unwrap_or(topic_hex)).ok()?;
    match ty {
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(..)
        | DynSolType::Tuple(_) => Some(AbiValue::Bytes(bytes)),
        _ => ty.abi_decode(&bytes).ok().map(normalize),
    }
}
