use serde::{Deserialize, Serialize};

/// Response of the blob compression (decompression-circuit) prover for one blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionProofResponse {
    pub data_parent_hash: String,
    pub prev_shnarf: String,
    pub expected_shnarf: String,
    pub data_hash: String,
    /// Hex-encoded sub-proof.
    #[serde(default)]
    pub decompression_proof: String,
    pub debug: CompressionDebugData,
    #[serde(default)]
    pub verifying_key_sha_sum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionDebugData {
    pub public_input: String,
}
