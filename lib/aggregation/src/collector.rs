use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt, stream};
use serde::de::DeserializeOwned;
use zkagg_mini_merkle_tree::pack_in_mini_trees;
use zkagg_prover_interface::{ProofClaim, ProvingBackend, parse_proof_claim};
use zkagg_types::{
    AggregationRequest, CompressionProofResponse, ExecutionProofResponse, RollingHashUpdated, hex,
};

use crate::{
    AggregationConfig, AggregationError, L2_MSG_MERKLE_TREE_DEPTH, metrics::AGGREGATION_METRICS,
    pack_offsets,
};

/// Chain-level view of an aggregation job, built by folding its sub-proof
/// responses in order.
#[derive(Debug, Clone)]
pub struct CollectedFields<P> {
    /// Set as soon as one execution response was produced in proofless mode.
    pub is_proofless_job: bool,
    /// Execution claims in chain order, followed by compression claims in chain order.
    pub proof_claims: Vec<ProofClaim<P>>,

    pub parent_state_root_hash: String,
    pub last_finalized_block_number: u64,
    pub final_block_number: u64,
    pub parent_aggregation_last_block_timestamp: u64,
    pub final_timestamp: u64,

    pub last_finalized_l1_rolling_hash: String,
    pub last_finalized_l1_rolling_hash_message_number: u64,
    pub l1_rolling_hash: String,
    pub l1_rolling_hash_message_number: u64,

    pub how_many_l2_msgs: usize,
    pub l2_msg_root_hashes: Vec<String>,
    pub l2_messaging_blocks_offsets: String,

    pub parent_aggregation_final_shnarf: String,
    pub final_shnarf: String,
    pub data_parent_hash: String,
    pub data_hashes: Vec<String>,
}

/// Accumulator of the scan. Every `apply_*` step consumes the state and returns
/// the updated one, so the scan is a plain fold over the response sequence.
struct FieldCollector<'a, B: ProvingBackend> {
    backend: &'a B,
    fields: CollectedFields<B::Proof>,
    l2_msg_hashes: Vec<String>,
    l2_msg_blocks: Vec<bool>,
    last_rolling_hash_update: Option<RollingHashUpdated>,
}

impl<'a, B: ProvingBackend> FieldCollector<'a, B> {
    fn new(backend: &'a B, request: &AggregationRequest) -> Self {
        let fields = CollectedFields {
            is_proofless_job: false,
            proof_claims: Vec::new(),
            parent_state_root_hash: String::new(),
            last_finalized_block_number: 0,
            final_block_number: 0,
            parent_aggregation_last_block_timestamp: request
                .parent_aggregation_last_block_timestamp,
            final_timestamp: 0,
            last_finalized_l1_rolling_hash: request
                .parent_aggregation_last_l1_rolling_hash
                .clone(),
            last_finalized_l1_rolling_hash_message_number: request
                .parent_aggregation_last_l1_rolling_hash_message_number,
            l1_rolling_hash: String::new(),
            l1_rolling_hash_message_number: 0,
            how_many_l2_msgs: 0,
            l2_msg_root_hashes: Vec::new(),
            l2_messaging_blocks_offsets: String::new(),
            parent_aggregation_final_shnarf: String::new(),
            final_shnarf: String::new(),
            data_parent_hash: String::new(),
            data_hashes: Vec::new(),
        };
        Self {
            backend,
            fields,
            l2_msg_hashes: Vec::new(),
            l2_msg_blocks: Vec::new(),
            last_rolling_hash_update: None,
        }
    }

    fn apply_execution(
        mut self,
        index: usize,
        path: &Path,
        response: ExecutionProofResponse,
    ) -> Result<Self, AggregationError> {
        let block_range_error = || AggregationError::BlockRange {
            path: path.to_owned(),
            first_block_number: response.first_block_number,
            block_count: response.blocks_data.len(),
        };

        if index == 0 {
            self.fields.last_finalized_block_number = response
                .first_block_number
                .checked_sub(1)
                .ok_or_else(block_range_error)?;
            self.fields
                .parent_state_root_hash
                .clone_from(&response.parent_state_root_hash);
        }

        self.fields.is_proofless_job |= response.prover_mode.is_proofless();

        if index > 0 && response.has_parent_state_root_hash_mismatch {
            return Err(AggregationError::SequenceInvariant {
                index,
                path: path.to_owned(),
            });
        }

        self.fields.final_block_number = response
            .last_block_number()
            .ok_or_else(block_range_error)?;

        tracing::debug!(
            index,
            path = %path.display(),
            first_block = response.first_block_number,
            last_block = self.fields.final_block_number,
            prover_mode = ?response.prover_mode,
            "folding execution response"
        );

        for block in response.blocks_data {
            self.l2_msg_blocks.push(block.has_messages());
            self.fields.how_many_l2_msgs += block.l2_to_l1_msg_hashes.len();
            self.l2_msg_hashes.extend(block.l2_to_l1_msg_hashes);
            if let Some(event) = block.last_rolling_hash_updated_event {
                self.last_rolling_hash_update = Some(event);
            }
            self.fields.final_timestamp = block.timestamp;
        }

        if !self.fields.is_proofless_job {
            let claim = parse_proof_claim(
                self.backend,
                &response.proof,
                &response.debug_data.final_hash,
                &response.verifying_key_sha_sum,
            )
            .map_err(|source| AggregationError::ProofClaim {
                path: path.to_owned(),
                source,
            })?;
            self.fields.proof_claims.push(claim);
        }

        AGGREGATION_METRICS.execution_responses.inc();
        Ok(self)
    }

    fn apply_compression(
        mut self,
        index: usize,
        path: &Path,
        response: CompressionProofResponse,
    ) -> Result<Self, AggregationError> {
        tracing::debug!(
            index,
            path = %path.display(),
            data_hash = %response.data_hash,
            "folding compression response"
        );

        if index == 0 {
            self.fields.data_parent_hash = response.data_parent_hash;
            self.fields.parent_aggregation_final_shnarf = response.prev_shnarf;
        }
        self.fields.final_shnarf = response.expected_shnarf;
        self.fields.data_hashes.push(response.data_hash);

        if !self.fields.is_proofless_job {
            let claim = parse_proof_claim(
                self.backend,
                &response.decompression_proof,
                &response.debug.public_input,
                &response.verifying_key_sha_sum,
            )
            .map_err(|source| AggregationError::ProofClaim {
                path: path.to_owned(),
                source,
            })?;
            self.fields.proof_claims.push(claim);
        }

        AGGREGATION_METRICS.compression_responses.inc();
        Ok(self)
    }

    fn finish(self) -> Result<CollectedFields<B::Proof>, AggregationError> {
        let mut fields = self.fields;

        match self.last_rolling_hash_update {
            Some(update) => {
                fields.l1_rolling_hash = update.rolling_hash;
                fields.l1_rolling_hash_message_number = update.message_number;
            }
            None => {
                fields
                    .l1_rolling_hash
                    .clone_from(&fields.last_finalized_l1_rolling_hash);
                fields.l1_rolling_hash_message_number =
                    fields.last_finalized_l1_rolling_hash_message_number;
            }
        }

        // Hashes are copied from the responses verbatim; outputs are lowercase hex.
        for hash in [
            &mut fields.parent_state_root_hash,
            &mut fields.last_finalized_l1_rolling_hash,
            &mut fields.l1_rolling_hash,
            &mut fields.parent_aggregation_final_shnarf,
            &mut fields.final_shnarf,
            &mut fields.data_parent_hash,
        ] {
            hash.make_ascii_lowercase();
        }
        for data_hash in &mut fields.data_hashes {
            data_hash.make_ascii_lowercase();
        }

        fields.l2_messaging_blocks_offsets =
            hex::encode_prefixed(pack_offsets(&self.l2_msg_blocks)?);
        fields.l2_msg_root_hashes =
            pack_in_mini_trees(&self.l2_msg_hashes, L2_MSG_MERKLE_TREE_DEPTH)?;

        AGGREGATION_METRICS
            .l2_messages
            .observe(fields.how_many_l2_msgs);
        AGGREGATION_METRICS
            .l2_message_trees
            .observe(fields.l2_msg_root_hashes.len());
        Ok(fields)
    }
}

/// Reads responses ahead of the fold, at most `concurrency` at a time, and yields
/// them in the order of `paths`.
fn read_responses<'a, T, R>(
    reader: &'a R,
    paths: &'a [PathBuf],
    concurrency: usize,
) -> impl Stream<Item = Result<T, AggregationError>> + 'a
where
    T: DeserializeOwned + 'a,
    R: crate::ResponseReader + ?Sized,
{
    stream::iter(paths)
        .map(move |path| async move {
            let bytes = reader
                .read(path)
                .await
                .map_err(|source| AggregationError::Read {
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_slice(&bytes).map_err(|source| AggregationError::Decode {
                path: path.clone(),
                source,
            })
        })
        .buffered(concurrency)
}

/// Folds the execution responses, then the compression responses of `request` into
/// [`CollectedFields`].
///
/// Response paths are resolved against the directories of `config`. Files may be
/// read concurrently, but they are applied strictly in request order and the first
/// failure aborts the whole collection.
pub async fn collect_fields<B, R>(
    config: &AggregationConfig,
    request: &AggregationRequest,
    reader: &R,
    backend: &B,
) -> Result<CollectedFields<B::Proof>, AggregationError>
where
    B: ProvingBackend,
    R: crate::ResponseReader + ?Sized,
{
    let latency = AGGREGATION_METRICS.collection_latency.start();
    let concurrency = config.effective_read_concurrency();
    let mut collector = FieldCollector::new(backend, request);

    let execution_paths: Vec<PathBuf> = request
        .execution_proofs
        .iter()
        .map(|path| config.execution_responses_dir.join(path))
        .collect();
    let mut responses = read_responses(reader, &execution_paths, concurrency).enumerate();
    while let Some((index, response)) = responses.next().await {
        collector = collector.apply_execution(index, &execution_paths[index], response?)?;
    }

    let compression_paths: Vec<PathBuf> = request
        .compression_proofs
        .iter()
        .map(|path| config.compression_responses_dir.join(path))
        .collect();
    let mut responses = read_responses(reader, &compression_paths, concurrency).enumerate();
    while let Some((index, response)) = responses.next().await {
        collector = collector.apply_compression(index, &compression_paths[index], response?)?;
    }

    let fields = collector.finish()?;
    let elapsed = latency.observe();
    tracing::info!(
        first_block = fields.last_finalized_block_number + 1,
        final_block = fields.final_block_number,
        l2_messages = fields.how_many_l2_msgs,
        l2_message_trees = fields.l2_msg_root_hashes.len(),
        claims = fields.proof_claims.len(),
        proofless = fields.is_proofless_job,
        ?elapsed,
        "collected aggregation fields"
    );
    Ok(fields)
}
