use serde::{Deserialize, Serialize};

/// Aggregation job as handed to the prover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRequest {
    /// Execution responses, relative to the execution responses directory, in chain order.
    pub execution_proofs: Vec<String>,
    /// Compression responses, relative to the compression responses directory, in chain order.
    pub compression_proofs: Vec<String>,
    pub parent_aggregation_last_block_timestamp: u64,
    pub parent_aggregation_last_l1_rolling_hash: String,
    pub parent_aggregation_last_l1_rolling_hash_message_number: u64,
}

/// Final output of an aggregation job.
///
/// Proof-related fields are `None` for proofless jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResponse {
    pub final_shnarf: String,
    pub parent_aggregation_final_shnarf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_prover_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_verifier_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_proof_public_input: Option<String>,
    pub data_hashes: Vec<String>,
    pub data_parent_hash: String,
    pub parent_state_root_hash: String,
    pub parent_aggregation_last_block_timestamp: u64,
    pub last_finalized_block_number: u64,
    pub final_timestamp: u64,
    pub final_block_number: u64,
    pub l1_rolling_hash: String,
    pub l1_rolling_hash_message_number: u64,
    pub l2_merkle_roots: Vec<String>,
    pub l2_merkle_trees_depth: u32,
    pub l2_messaging_blocks_offsets: String,
}

impl AggregationResponse {
    pub fn is_proofless(&self) -> bool {
        self.aggregated_proof.is_none()
    }
}
