use std::path::PathBuf;

use zkagg_mini_merkle_tree::MiniMerkleTreeError;
use zkagg_prover_interface::ClaimDecodingError;
use zkagg_types::HexError;

use crate::{OffsetOverflow, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("fields collection, reading `{}`: {source:#}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("fields collection, decoding `{}`: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Only the first conflated batch of a job may start from a state root the
    /// prover disagrees with. A mismatch further down the sequence means the
    /// upstream pipeline handed over a broken chain; retrying the job cannot help.
    #[error(
        "conflated batch #{index} (`{}`) has a parent state root hash mismatch \
         but is not the first of the sequence",
        .path.display()
    )]
    SequenceInvariant { index: usize, path: PathBuf },
    #[error(
        "execution response `{}` has an invalid block range: \
         first block {first_block_number}, {block_count} blocks",
        .path.display()
    )]
    BlockRange {
        path: PathBuf,
        first_block_number: u64,
        block_count: usize,
    },
    #[error("could not parse the proof claim of `{}`: {source}", .path.display())]
    ProofClaim {
        path: PathBuf,
        #[source]
        source: ClaimDecodingError,
    },
    #[error("packing L2 messaging block offsets: {0}")]
    OffsetOverflow(#[from] OffsetOverflow),
    #[error("building L2 message trees: {0}")]
    MessageTree(#[from] MiniMerkleTreeError),
    #[error("invalid collected fields: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("assembling the aggregated public input: {0}")]
    PublicInput(#[source] HexError),
    #[error("aggregated proving failed: {0:#}")]
    Proving(#[source] anyhow::Error),
}

impl AggregationError {
    /// Whether rerunning the job (e.g. after the inputs are regenerated) may succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SequenceInvariant { .. })
    }
}
