use thiserror::Error;

/// Errors raised while loading ABIs or encoding/decoding against them.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid ABI JSON: {0}")]
    InvalidAbi(String),

    #[error("function '{name}' not found in ABI")]
    FunctionNotFound { name: String },

    #[error("argument count mismatch for '{name}': ABI has {expected}, got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("cannot encode parameter '{param}': {reason}")]
    Encode { param: String, reason: String },

    #[error("ABI decode failed: {0}")]
    Decode(String),
}
