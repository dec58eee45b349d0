mod backend;
pub use backend::{BLS12_377_SCALAR_FIELD_MODULUS, ProvingBackend};

mod claim;
pub use claim::{ClaimDecodingError, ProofClaim, parse_proof_claim};

mod dev;
pub use dev::{DevProof, DevProvingBackend};

mod field;
pub use field::{FieldElement, FieldElementError};
