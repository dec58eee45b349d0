//! Aggregation pipeline of the prover.
//!
//! A job goes through two steps. [`collect_fields`] reads the execution and
//! compression responses named by an [`AggregationRequest`](zkagg_types::AggregationRequest)
//! and folds them, in chain order, into [`CollectedFields`]. [`craft_response`] then
//! validates those fields, computes the aggregated public input and asks the
//! [`ProvingBackend`](zkagg_prover_interface::ProvingBackend) for the aggregated proof.

mod collector;
pub use collector::{CollectedFields, collect_fields};

mod config;
pub use config::AggregationConfig;

mod craft;
pub use craft::{craft_response, prove_aggregation};

mod error;
pub use error::AggregationError;

mod metrics;

mod offsets;
pub use offsets::{OffsetOverflow, pack_offsets};

mod public_input;
pub use public_input::AggregationPublicInput;

mod reader;
pub use reader::{FsResponseReader, ResponseReader};

mod validate;
pub use validate::{ValidationError, ValidationErrors, validate};

/// Depth of every L2-to-L1 message tree; each tree commits to up to 32 messages.
/// Must stay in sync with the L1 verifier contract.
pub const L2_MSG_MERKLE_TREE_DEPTH: u32 = 5;

#[cfg(test)]
mod tests;
