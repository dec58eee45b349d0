use alloy::primitives::{B256, U256};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldElementError {
    #[error("missing `0x` prefix")]
    MissingPrefix,
    #[error("not a hex number of at most 256 bits")]
    Malformed,
    #[error("value is not smaller than the field modulus 0x{modulus:x}")]
    NotInField { modulus: U256 },
}

/// Element of the scalar field a sub-proof's public input lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldElement(U256);

impl FieldElement {
    /// Parses a `0x`-prefixed hex number, rejecting values outside `[0, modulus)`.
    pub fn from_hex_str(value: &str, modulus: U256) -> Result<Self, FieldElementError> {
        let digits = value
            .strip_prefix("0x")
            .ok_or(FieldElementError::MissingPrefix)?;
        if digits.is_empty() {
            return Err(FieldElementError::Malformed);
        }
        let value = U256::from_str_radix(digits, 16).map_err(|_| FieldElementError::Malformed)?;
        if value >= modulus {
            return Err(FieldElementError::NotInField { modulus });
        }
        Ok(Self(value))
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Canonical 32-byte big-endian encoding.
    pub fn to_be_bytes32(&self) -> B256 {
        B256::from(self.0.to_be_bytes::<32>())
    }
}
