//! Types shared by the aggregation pipeline: the JSON records produced by the
//! execution and compression provers, the aggregation request and the final
//! aggregated response.

pub mod hex;
pub use hex::HexError;

mod execution;
pub use execution::{ExecutionDebugData, ExecutionProofResponse, L2BlockData, RollingHashUpdated};

mod compression;
pub use compression::{CompressionDebugData, CompressionProofResponse};

mod aggregation;
pub use aggregation::{AggregationRequest, AggregationResponse};

mod prover_mode;
pub use prover_mode::ProverMode;
