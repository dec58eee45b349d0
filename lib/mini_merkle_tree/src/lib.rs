//! Small, fixed-depth Merkle trees used to commit to the L2-to-L1 messages of an
//! aggregation.
//!
//! A message list is split into consecutive chunks of `2^depth` leaves. The last
//! chunk is right-padded with zero leaves and every chunk is hashed into its own
//! complete binary tree with Keccak-256. The list of chunk roots forms the forest.

use alloy::primitives::{B256, keccak256};
use zkagg_types::hex::{self, HexError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum MiniMerkleTreeError {
    #[error("message hash #{index} is not a 32-byte hex digest: {source}")]
    InvalidLeaf {
        index: usize,
        #[source]
        source: HexError,
    },
    #[error("{count} leaves do not fit in a tree of depth {depth}")]
    TooManyLeaves { count: usize, depth: u32 },
}

/// Complete binary tree of a fixed depth; missing leaves are zero.
#[derive(Debug, Clone)]
pub struct MiniMerkleTree {
    depth: u32,
    leaves: Vec<B256>,
}

impl MiniMerkleTree {
    pub fn new(
        leaves: impl IntoIterator<Item = B256>,
        depth: u32,
    ) -> Result<Self, MiniMerkleTreeError> {
        let capacity = max_leaves(depth);
        let mut leaves: Vec<B256> = leaves.into_iter().collect();
        if leaves.len() > capacity {
            return Err(MiniMerkleTreeError::TooManyLeaves {
                count: leaves.len(),
                depth,
            });
        }
        leaves.resize(capacity, B256::ZERO);
        Ok(Self { depth, leaves })
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn root(&self) -> B256 {
        let mut level = self.leaves.clone();
        while level.len() > 1 {
            level = level
                .chunks_exact(2)
                .map(|pair| hash_children(&pair[0], &pair[1]))
                .collect();
        }
        level[0]
    }
}

fn hash_children(left: &B256, right: &B256) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(left.as_slice());
    preimage[32..].copy_from_slice(right.as_slice());
    keccak256(preimage)
}

/// Number of leaves a tree of `depth` holds.
pub const fn max_leaves(depth: u32) -> usize {
    1 << depth
}

/// Hashes hex-encoded message hashes into a forest of trees of the given depth and
/// returns the hex-encoded roots in chunk order.
///
/// No message yields no root: an empty list is never padded into an all-zero tree.
pub fn pack_in_mini_trees<S: AsRef<str>>(
    message_hashes: &[S],
    depth: u32,
) -> Result<Vec<String>, MiniMerkleTreeError> {
    let capacity = max_leaves(depth);
    message_hashes
        .chunks(capacity)
        .enumerate()
        .map(|(chunk_index, chunk)| {
            let leaves = chunk
                .iter()
                .enumerate()
                .map(|(offset, leaf)| {
                    hex::decode_bytes32(leaf.as_ref()).map_err(|source| {
                        MiniMerkleTreeError::InvalidLeaf {
                            index: chunk_index * capacity + offset,
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let tree = MiniMerkleTree::new(leaves, depth)?;
            Ok(hex::encode_prefixed(tree.root()))
        })
        .collect()
}
