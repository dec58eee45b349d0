use crate::{ProofClaim, ProvingBackend};
use alloy::primitives::{B256, keccak256};

/// Backend for local runs and tests. It does not verify anything: the "proof" it
/// outputs is a Keccak commitment to the public input and to every claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevProvingBackend;

/// Digest of the raw sub-proof bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevProof(pub B256);

impl ProvingBackend for DevProvingBackend {
    type Proof = DevProof;

    fn decode_proof(&self, bytes: &[u8]) -> anyhow::Result<DevProof> {
        anyhow::ensure!(!bytes.is_empty(), "empty proof");
        Ok(DevProof(keccak256(bytes)))
    }

    fn prove(
        &self,
        public_input: B256,
        claims: &[ProofClaim<DevProof>],
    ) -> anyhow::Result<Vec<u8>> {
        tracing::debug!(
            claims = claims.len(),
            %public_input,
            "committing to claims with the dev backend"
        );

        let mut preimage = Vec::with_capacity(32 + claims.len() * 96);
        preimage.extend_from_slice(public_input.as_slice());
        for claim in claims {
            preimage.extend_from_slice(claim.verifying_key_sha_sum.as_slice());
            preimage.extend_from_slice(claim.public_input.to_be_bytes32().as_slice());
            preimage.extend_from_slice(claim.proof.0.as_slice());
        }
        Ok(keccak256(preimage).to_vec())
    }
}
