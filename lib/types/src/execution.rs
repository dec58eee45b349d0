use crate::ProverMode;
use serde::{Deserialize, Serialize};

/// Response of the execution prover for one conflated batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionProofResponse {
    pub first_block_number: u64,
    #[serde(default)]
    pub blocks_data: Vec<L2BlockData>,
    pub parent_state_root_hash: String,
    /// May only be set by the first response of an aggregation.
    #[serde(default)]
    pub has_parent_state_root_hash_mismatch: bool,
    pub prover_mode: ProverMode,
    /// Hex-encoded sub-proof.
    #[serde(default)]
    pub proof: String,
    pub debug_data: ExecutionDebugData,
    #[serde(default)]
    pub verifying_key_sha_sum: String,
}

impl ExecutionProofResponse {
    /// Last block covered by this response. `None` on arithmetic overflow or when
    /// the response claims zero blocks starting at block zero.
    pub fn last_block_number(&self) -> Option<u64> {
        self.first_block_number
            .checked_add(self.blocks_data.len() as u64)?
            .checked_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDebugData {
    /// Public input of the execution proof.
    pub final_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2BlockData {
    #[serde(default)]
    pub l2_to_l1_msg_hashes: Vec<String>,
    /// Absent when the block did not update the L1 rolling hash. A present event is
    /// always an update, even if all of its values are zero.
    #[serde(default)]
    pub last_rolling_hash_updated_event: Option<RollingHashUpdated>,
    pub timestamp: u64,
}

impl L2BlockData {
    pub fn has_messages(&self) -> bool {
        !self.l2_to_l1_msg_hashes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingHashUpdated {
    pub message_number: u64,
    pub rolling_hash: String,
}
