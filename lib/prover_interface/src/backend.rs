use crate::ProofClaim;
use alloy::primitives::{B256, U256, uint};

/// Scalar field of BLS12-377, the curve the execution and compression sub-proofs are
/// produced over.
pub const BLS12_377_SCALAR_FIELD_MODULUS: U256 =
    uint!(0x12ab655e9a2ca55660b44d1e5c37b00159aa76fed00000010a11800000000001_U256);

/// Boundary to the proof system that verifies sub-proofs recursively and produces the
/// aggregated proof.
///
/// The aggregation pipeline never looks inside proofs: it asks the backend to turn
/// raw bytes into an opaque [`ProvingBackend::Proof`] and hands the collected claims
/// back when proving.
pub trait ProvingBackend: Send + Sync {
    type Proof: Send + Sync + 'static;

    /// Modulus of the field sub-proof public inputs must belong to.
    const SCALAR_FIELD_MODULUS: U256 = BLS12_377_SCALAR_FIELD_MODULUS;

    fn decode_proof(&self, bytes: &[u8]) -> anyhow::Result<Self::Proof>;

    /// Proves the aggregation of `claims` (execution claims first, then compression
    /// claims, each in chain order) under the given aggregated public input.
    fn prove(
        &self,
        public_input: B256,
        claims: &[ProofClaim<Self::Proof>],
    ) -> anyhow::Result<Vec<u8>>;
}
