use zkagg_prover_interface::ProvingBackend;
use zkagg_types::{AggregationRequest, AggregationResponse, hex};

use crate::{
    AggregationConfig, AggregationError, AggregationPublicInput, CollectedFields,
    L2_MSG_MERKLE_TREE_DEPTH, ResponseReader, collect_fields, metrics::AGGREGATION_METRICS,
    validate,
};

/// Validates `fields` and turns them into the aggregated response, proving it
/// unless the job is proofless.
pub fn craft_response<B: ProvingBackend>(
    config: &AggregationConfig,
    fields: CollectedFields<B::Proof>,
    backend: &B,
) -> Result<AggregationResponse, AggregationError> {
    validate(&fields)?;

    let public_input = (!fields.is_proofless_job)
        .then(|| AggregationPublicInput::new(&fields, L2_MSG_MERKLE_TREE_DEPTH));

    let mut response = AggregationResponse {
        final_shnarf: fields.final_shnarf,
        parent_aggregation_final_shnarf: fields.parent_aggregation_final_shnarf,
        aggregated_proof: None,
        aggregated_prover_version: None,
        aggregated_verifier_index: None,
        aggregated_proof_public_input: None,
        data_hashes: fields.data_hashes,
        data_parent_hash: fields.data_parent_hash,
        parent_state_root_hash: fields.parent_state_root_hash,
        parent_aggregation_last_block_timestamp: fields.parent_aggregation_last_block_timestamp,
        last_finalized_block_number: fields.last_finalized_block_number,
        final_timestamp: fields.final_timestamp,
        final_block_number: fields.final_block_number,
        l1_rolling_hash: fields.l1_rolling_hash,
        l1_rolling_hash_message_number: fields.l1_rolling_hash_message_number,
        l2_merkle_roots: fields.l2_msg_root_hashes,
        l2_merkle_trees_depth: L2_MSG_MERKLE_TREE_DEPTH,
        l2_messaging_blocks_offsets: fields.l2_messaging_blocks_offsets,
    };

    let Some(public_input) = public_input else {
        AGGREGATION_METRICS.proofless_jobs.inc();
        tracing::info!(
            first_block = response.last_finalized_block_number + 1,
            final_block = response.final_block_number,
            "proofless job, skipping aggregated proving"
        );
        return Ok(response);
    };

    let digest = public_input.sum().map_err(AggregationError::PublicInput)?;
    tracing::info!(
        first_block = public_input.last_finalized_block_number + 1,
        final_block = public_input.final_block_number,
        ?public_input,
        "public input components"
    );

    let latency = AGGREGATION_METRICS.proving_latency.start();
    let proof = backend
        .prove(digest, &fields.proof_claims)
        .map_err(AggregationError::Proving)?;
    let elapsed = latency.observe();
    tracing::info!(
        claims = fields.proof_claims.len(),
        proof_len = proof.len(),
        ?elapsed,
        "aggregated proof generated"
    );

    response.aggregated_proof = Some(hex::encode_prefixed(proof));
    response.aggregated_proof_public_input = Some(hex::encode_prefixed(digest));
    response.aggregated_verifier_index = Some(config.verifier_id);
    response.aggregated_prover_version = Some(config.prover_version.clone());
    Ok(response)
}

/// Runs a whole aggregation job: collects the fields of `request` and crafts the
/// response from them.
pub async fn prove_aggregation<B, R>(
    config: &AggregationConfig,
    request: &AggregationRequest,
    reader: &R,
    backend: &B,
) -> Result<AggregationResponse, AggregationError>
where
    B: ProvingBackend,
    R: ResponseReader + ?Sized,
{
    let fields = collect_fields(config, request, reader, backend).await?;
    craft_response(config, fields, backend)
}
