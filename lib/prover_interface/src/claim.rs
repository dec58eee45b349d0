use crate::{FieldElement, FieldElementError, ProvingBackend};
use alloy::primitives::B256;
use zkagg_types::hex::{self, HexError};

/// A sub-proof as consumed by the recursive verifier.
#[derive(Debug, Clone)]
pub struct ProofClaim<P> {
    pub verifying_key_sha_sum: B256,
    pub public_input: FieldElement,
    pub proof: P,
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimDecodingError {
    #[error("could not parse proof as an hex string: {0}")]
    MalformedProof(#[source] HexError),
    #[error("the verifying key shasum is empty")]
    EmptyVerifyingKeyShaSum,
    #[error("malformed verifying key shasum `{value}`: {source}")]
    MalformedVerifyingKeyShaSum {
        value: String,
        #[source]
        source: HexError,
    },
    #[error("the public input `{value}` could not be parsed: {source}")]
    PublicInput {
        value: String,
        #[source]
        source: FieldElementError,
    },
    #[error("could not parse the proof from bytes: {0:#}")]
    ProofBytes(#[source] anyhow::Error),
}

/// Turns the hex-encoded parts of a sub-proof response into a typed claim.
pub fn parse_proof_claim<B: ProvingBackend + ?Sized>(
    backend: &B,
    proof_hex: &str,
    public_input_hex: &str,
    verifying_key_sha_sum: &str,
) -> Result<ProofClaim<B::Proof>, ClaimDecodingError> {
    let proof_bytes = hex::decode_prefixed(proof_hex).map_err(ClaimDecodingError::MalformedProof)?;

    if verifying_key_sha_sum.is_empty() {
        return Err(ClaimDecodingError::EmptyVerifyingKeyShaSum);
    }
    let verifying_key_sha_sum = hex::decode_bytes32(verifying_key_sha_sum).map_err(|source| {
        ClaimDecodingError::MalformedVerifyingKeyShaSum {
            value: verifying_key_sha_sum.to_owned(),
            source,
        }
    })?;

    let public_input = FieldElement::from_hex_str(public_input_hex, B::SCALAR_FIELD_MODULUS)
        .map_err(|source| ClaimDecodingError::PublicInput {
            value: public_input_hex.to_owned(),
            source,
        })?;

    let proof = backend
        .decode_proof(&proof_bytes)
        .map_err(ClaimDecodingError::ProofBytes)?;

    Ok(ProofClaim {
        verifying_key_sha_sum,
        public_input,
        proof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DevProvingBackend;
    use assert_matches::assert_matches;

    fn vk() -> String {
        hex::encode_prefixed(B256::repeat_byte(0x11))
    }

    #[test]
    fn decodes_claim() {
        let claim = parse_proof_claim(&DevProvingBackend, "0xdeadbeef", "0x05", &vk()).unwrap();
        assert_eq!(claim.verifying_key_sha_sum, B256::repeat_byte(0x11));
        assert_eq!(claim.public_input.as_u256(), alloy::primitives::U256::from(5));
    }

    #[test]
    fn rejects_malformed_proof_hex() {
        assert_matches!(
            parse_proof_claim(&DevProvingBackend, "0xdeadbee", "0x05", &vk()),
            Err(ClaimDecodingError::MalformedProof(_))
        );
    }

    #[test]
    fn rejects_empty_checksum() {
        assert_matches!(
            parse_proof_claim(&DevProvingBackend, "0xdeadbeef", "0x05", ""),
            Err(ClaimDecodingError::EmptyVerifyingKeyShaSum)
        );
        assert_matches!(
            parse_proof_claim(&DevProvingBackend, "0xdeadbeef", "0x05", "0x1111"),
            Err(ClaimDecodingError::MalformedVerifyingKeyShaSum { .. })
        );
    }

    #[test]
    fn rejects_unparsable_public_input() {
        let out_of_field = format!("0x{}", "ff".repeat(32));
        assert_matches!(
            parse_proof_claim(&DevProvingBackend, "0xdeadbeef", &out_of_field, &vk()),
            Err(ClaimDecodingError::PublicInput { .. })
        );
    }

    #[test]
    fn backend_rejection_is_wrapped() {
        assert_matches!(
            parse_proof_claim(&DevProvingBackend, "0x", "0x05", &vk()),
            Err(ClaimDecodingError::ProofBytes(_))
        );
    }
}
