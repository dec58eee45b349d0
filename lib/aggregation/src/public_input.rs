use alloy::primitives::{B256, U256, keccak256};
use zkagg_types::hex::{self, HexError};

use crate::CollectedFields;

/// Chain-level values the aggregated proof commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPublicInput {
    pub parent_aggregation_final_shnarf: String,
    pub final_shnarf: String,
    pub parent_state_root_hash: String,
    pub parent_aggregation_last_block_timestamp: u64,
    pub final_timestamp: u64,
    pub last_finalized_block_number: u64,
    pub final_block_number: u64,
    pub last_finalized_l1_rolling_hash: String,
    pub l1_rolling_hash: String,
    pub last_finalized_l1_rolling_hash_message_number: u64,
    pub l1_rolling_hash_message_number: u64,
    pub l2_msg_root_hashes: Vec<String>,
    pub l2_msg_merkle_tree_depth: u32,
}

impl AggregationPublicInput {
    pub fn new<P>(fields: &CollectedFields<P>, l2_msg_merkle_tree_depth: u32) -> Self {
        Self {
            parent_aggregation_final_shnarf: fields.parent_aggregation_final_shnarf.clone(),
            final_shnarf: fields.final_shnarf.clone(),
            parent_state_root_hash: fields.parent_state_root_hash.clone(),
            parent_aggregation_last_block_timestamp: fields.parent_aggregation_last_block_timestamp,
            final_timestamp: fields.final_timestamp,
            last_finalized_block_number: fields.last_finalized_block_number,
            final_block_number: fields.final_block_number,
            last_finalized_l1_rolling_hash: fields.last_finalized_l1_rolling_hash.clone(),
            l1_rolling_hash: fields.l1_rolling_hash.clone(),
            last_finalized_l1_rolling_hash_message_number: fields
                .last_finalized_l1_rolling_hash_message_number,
            l1_rolling_hash_message_number: fields.l1_rolling_hash_message_number,
            l2_msg_root_hashes: fields.l2_msg_root_hashes.clone(),
            l2_msg_merkle_tree_depth,
        }
    }

    /// Digest of all components, reduced to 253 bits so that it is a valid scalar of
    /// the outer proof system.
    pub fn sum(&self) -> Result<B256, HexError> {
        let mut roots = Vec::with_capacity(self.l2_msg_root_hashes.len() * 32);
        for root in &self.l2_msg_root_hashes {
            roots.extend_from_slice(hex::decode_bytes32(root)?.as_slice());
        }

        let mut preimage = Vec::with_capacity(13 * 32);
        push_hash(&mut preimage, &self.parent_aggregation_final_shnarf)?;
        push_hash(&mut preimage, &self.final_shnarf)?;
        push_hash(&mut preimage, &self.parent_state_root_hash)?;
        push_word(&mut preimage, self.parent_aggregation_last_block_timestamp);
        push_word(&mut preimage, self.final_timestamp);
        push_word(&mut preimage, self.last_finalized_block_number);
        push_word(&mut preimage, self.final_block_number);
        push_hash(&mut preimage, &self.last_finalized_l1_rolling_hash)?;
        push_hash(&mut preimage, &self.l1_rolling_hash)?;
        push_word(&mut preimage, self.last_finalized_l1_rolling_hash_message_number);
        push_word(&mut preimage, self.l1_rolling_hash_message_number);
        push_word(&mut preimage, u64::from(self.l2_msg_merkle_tree_depth));
        preimage.extend_from_slice(keccak256(&roots).as_slice());

        let mut digest = keccak256(&preimage);
        digest[0] &= 0x1f;
        Ok(digest)
    }

    pub fn public_input_hex(&self) -> Result<String, HexError> {
        Ok(hex::encode_prefixed(self.sum()?))
    }
}

fn push_hash(preimage: &mut Vec<u8>, value: &str) -> Result<(), HexError> {
    preimage.extend_from_slice(hex::decode_bytes32(value)?.as_slice());
    Ok(())
}

fn push_word(preimage: &mut Vec<u8>, value: u64) {
    preimage.extend_from_slice(&U256::from(value).to_be_bytes::<32>());
}
