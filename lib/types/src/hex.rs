//! Helpers for the `0x`-prefixed hex strings used at every boundary of the pipeline.

use alloy::primitives::{B256, hex};

#[derive(Debug, Clone, thiserror::Error)]
pub enum HexError {
    #[error("missing `0x` prefix")]
    MissingPrefix,
    #[error("not a valid hex string: {0}")]
    Invalid(#[from] hex::FromHexError),
    #[error("expected {expected} bytes, got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },
}

/// Decodes a `0x`-prefixed hex string of any length.
pub fn decode_prefixed(value: &str) -> Result<Vec<u8>, HexError> {
    let digits = value.strip_prefix("0x").ok_or(HexError::MissingPrefix)?;
    Ok(hex::decode(digits)?)
}

/// Decodes a `0x`-prefixed hex string that must hold exactly 32 bytes.
pub fn decode_bytes32(value: &str) -> Result<B256, HexError> {
    let bytes = decode_prefixed(value)?;
    if bytes.len() != B256::len_bytes() {
        return Err(HexError::UnexpectedLength {
            expected: B256::len_bytes(),
            actual: bytes.len(),
        });
    }
    Ok(B256::from_slice(&bytes))
}

/// Checks that `value` is well-formed hex. `expected_len` of `None` accepts any byte length.
pub fn validate(value: &str, expected_len: Option<usize>) -> Result<(), HexError> {
    let bytes = decode_prefixed(value)?;
    match expected_len {
        Some(expected) if bytes.len() != expected => Err(HexError::UnexpectedLength {
            expected,
            actual: bytes.len(),
        }),
        _ => Ok(()),
    }
}

/// Lowercase, `0x`-prefixed encoding.
pub fn encode_prefixed(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_prefixed(bytes)
}
