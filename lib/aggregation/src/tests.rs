use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use alloy::primitives::B256;
use assert_matches::assert_matches;
use zkagg_prover_interface::{ClaimDecodingError, DevProof, DevProvingBackend, ProvingBackend};
use zkagg_types::{
    AggregationRequest, CompressionDebugData, CompressionProofResponse, ExecutionDebugData,
    ExecutionProofResponse, HexError, L2BlockData, ProverMode, RollingHashUpdated, hex,
};

use super::*;

fn hash(byte: u8) -> String {
    hex::encode_prefixed(B256::repeat_byte(byte))
}

fn vk() -> String {
    hash(0xaa)
}

fn block(timestamp: u64, messages: &[u8]) -> L2BlockData {
    L2BlockData {
        l2_to_l1_msg_hashes: messages.iter().map(|byte| hash(*byte)).collect(),
        last_rolling_hash_updated_event: None,
        timestamp,
    }
}

fn with_event(mut block: L2BlockData, rolling_hash: &str, message_number: u64) -> L2BlockData {
    block.last_rolling_hash_updated_event = Some(RollingHashUpdated {
        message_number,
        rolling_hash: rolling_hash.to_owned(),
    });
    block
}

fn execution(first_block_number: u64, blocks_data: Vec<L2BlockData>) -> ExecutionProofResponse {
    ExecutionProofResponse {
        first_block_number,
        blocks_data,
        parent_state_root_hash: hash(0x50),
        has_parent_state_root_hash_mismatch: false,
        prover_mode: ProverMode::Full,
        proof: "0xc0ffee".into(),
        debug_data: ExecutionDebugData {
            final_hash: "0x0123".into(),
        },
        verifying_key_sha_sum: vk(),
    }
}

fn compression(index: u8) -> CompressionProofResponse {
    CompressionProofResponse {
        data_parent_hash: hash(0x60 + index),
        prev_shnarf: hash(0x70 + index),
        expected_shnarf: hash(0x71 + index),
        data_hash: hash(0x80 + index),
        decompression_proof: "0xbeef".into(),
        debug: CompressionDebugData {
            public_input: "0x0456".into(),
        },
        verifying_key_sha_sum: vk(),
    }
}

#[derive(Debug, Default)]
struct MockReader {
    files: HashMap<PathBuf, Vec<u8>>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MockReader {
    fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.as_ref().to_owned(), contents.into());
    }
}

#[async_trait::async_trait]
impl ResponseReader for MockReader {
    async fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        self.reads.lock().unwrap().push(path.to_owned());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file"))
    }
}

struct Job {
    config: AggregationConfig,
    request: AggregationRequest,
    reader: MockReader,
}

impl Job {
    fn new() -> Self {
        let config = AggregationConfig {
            verifier_id: 3,
            prover_version: "test-version".into(),
            execution_responses_dir: "execution".into(),
            compression_responses_dir: "compression".into(),
            read_concurrency: 4,
        };
        let request = AggregationRequest {
            execution_proofs: Vec::new(),
            compression_proofs: Vec::new(),
            parent_aggregation_last_block_timestamp: 1_000,
            parent_aggregation_last_l1_rolling_hash: hash(0x10),
            parent_aggregation_last_l1_rolling_hash_message_number: 42,
        };
        Self {
            config,
            request,
            reader: MockReader::default(),
        }
    }

    fn push_execution(&mut self, response: &ExecutionProofResponse) -> &mut Self {
        let name = format!("{}-exec.json", self.request.execution_proofs.len());
        self.reader.insert(
            self.config.execution_responses_dir.join(&name),
            serde_json::to_vec(response).unwrap(),
        );
        self.request.execution_proofs.push(name);
        self
    }

    fn push_compression(&mut self, response: &CompressionProofResponse) -> &mut Self {
        let name = format!("{}-compr.json", self.request.compression_proofs.len());
        self.reader.insert(
            self.config.compression_responses_dir.join(&name),
            serde_json::to_vec(response).unwrap(),
        );
        self.request.compression_proofs.push(name);
        self
    }

    async fn collect(&self) -> Result<CollectedFields<DevProof>, AggregationError> {
        collect_fields(
            &self.config,
            &self.request,
            &self.reader,
            &DevProvingBackend,
        )
        .await
    }

    async fn prove(&self) -> Result<zkagg_types::AggregationResponse, AggregationError> {
        prove_aggregation(
            &self.config,
            &self.request,
            &self.reader,
            &DevProvingBackend,
        )
        .await
    }
}

/// Two execution batches (blocks 100..=102) and two compression batches.
fn simple_job() -> Job {
    let mut job = Job::new();
    job.push_execution(&execution(100, vec![block(1_001, &[1]), block(1_002, &[])]))
        .push_execution(&execution(102, vec![block(1_003, &[2, 3])]))
        .push_compression(&compression(0))
        .push_compression(&compression(1));
    job
}

#[test_log::test(tokio::test)]
async fn collects_chain_fields_in_order() {
    let job = simple_job();
    let fields = job.collect().await.unwrap();

    assert!(!fields.is_proofless_job);
    assert_eq!(fields.last_finalized_block_number, 99);
    assert_eq!(fields.final_block_number, 102);
    assert_eq!(fields.parent_state_root_hash, hash(0x50));
    assert_eq!(fields.parent_aggregation_last_block_timestamp, 1_000);
    assert_eq!(fields.final_timestamp, 1_003);

    assert_eq!(fields.data_parent_hash, hash(0x60));
    assert_eq!(fields.parent_aggregation_final_shnarf, hash(0x70));
    assert_eq!(fields.final_shnarf, hash(0x72));
    assert_eq!(fields.data_hashes, [hash(0x80), hash(0x81)]);

    // Execution claims come first, then compression claims.
    assert_eq!(fields.proof_claims.len(), 4);
    let public_inputs: Vec<_> = fields
        .proof_claims
        .iter()
        .map(|claim| claim.public_input.as_u256().to::<u64>())
        .collect();
    assert_eq!(public_inputs, [0x0123, 0x0123, 0x0456, 0x0456]);

    assert_eq!(fields.how_many_l2_msgs, 3);
    assert_eq!(fields.l2_msg_root_hashes.len(), 1);
    // Blocks #1 and #3 of the aggregation carry messages.
    assert_eq!(fields.l2_messaging_blocks_offsets, "0x00010003");
}

#[test_log::test(tokio::test)]
async fn responses_are_read_from_configured_dirs() {
    let mut job = simple_job();
    job.config.read_concurrency = 1;
    job.collect().await.unwrap();

    let reads = job.reader.reads.lock().unwrap().clone();
    assert_eq!(
        reads,
        [
            PathBuf::from("execution/0-exec.json"),
            PathBuf::from("execution/1-exec.json"),
            PathBuf::from("compression/0-compr.json"),
            PathBuf::from("compression/1-compr.json"),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn mismatch_after_the_first_batch_is_an_invariant_violation() {
    let mut job = Job::new();
    let mut second = execution(101, vec![block(1_002, &[])]);
    second.has_parent_state_root_hash_mismatch = true;
    job.push_execution(&execution(100, vec![block(1_001, &[])]))
        .push_execution(&second);

    let err = job.collect().await.unwrap_err();
    assert_matches!(err, AggregationError::SequenceInvariant { index: 1, .. });
    assert!(!err.is_recoverable());
}

#[test_log::test(tokio::test)]
async fn mismatch_on_the_first_batch_is_accepted() {
    let mut job = Job::new();
    let mut first = execution(100, vec![block(1_001, &[])]);
    first.has_parent_state_root_hash_mismatch = true;
    job.push_execution(&first)
        .push_execution(&execution(101, vec![block(1_002, &[])]))
        .push_compression(&compression(0));

    let fields = job.collect().await.unwrap();
    assert_eq!(fields.final_block_number, 101);
}

#[tokio::test]
async fn last_rolling_hash_event_wins() {
    let mut job = Job::new();
    job.push_execution(&execution(
        10,
        vec![
            block(1_001, &[]),
            with_event(block(1_002, &[]), &hash(0xa0), 50),
            block(1_003, &[]),
        ],
    ))
    .push_execution(&execution(
        13,
        vec![
            block(1_004, &[]),
            with_event(block(1_005, &[]), &hash(0xb0), 53),
            block(1_006, &[]),
            block(1_007, &[]),
        ],
    ))
    .push_compression(&compression(0));

    let fields = job.collect().await.unwrap();
    assert_eq!(fields.l1_rolling_hash, hash(0xb0));
    assert_eq!(fields.l1_rolling_hash_message_number, 53);
    assert_eq!(fields.final_timestamp, 1_007);
}

#[tokio::test]
async fn rolling_hash_falls_back_to_parent_aggregation() {
    let mut job = simple_job();
    job.request.parent_aggregation_last_l1_rolling_hash = hash(0x33);
    job.request
        .parent_aggregation_last_l1_rolling_hash_message_number = 77;

    let fields = job.collect().await.unwrap();
    assert_eq!(fields.l1_rolling_hash, hash(0x33));
    assert_eq!(fields.l1_rolling_hash_message_number, 77);
    assert_eq!(fields.last_finalized_l1_rolling_hash, hash(0x33));
}

#[tokio::test]
async fn zeroed_rolling_hash_event_is_still_an_update() {
    let mut job = Job::new();
    job.push_execution(&execution(
        10,
        vec![with_event(block(1_001, &[]), &hash(0), 0)],
    ))
    .push_compression(&compression(0));

    let fields = job.collect().await.unwrap();
    assert_eq!(fields.l1_rolling_hash, hash(0));
    assert_eq!(fields.l1_rolling_hash_message_number, 0);
}

#[test_log::test(tokio::test)]
async fn proofless_flag_is_sticky() {
    let mut job = Job::new();
    let mut first = execution(100, vec![block(1_001, &[1])]);
    first.prover_mode = ProverMode::Proofless;
    first.proof = String::new();
    first.verifying_key_sha_sum = String::new();
    job.push_execution(&first)
        .push_execution(&execution(101, vec![block(1_002, &[])]))
        .push_execution(&execution(102, vec![block(1_003, &[])]))
        .push_compression(&compression(0));

    let fields = job.collect().await.unwrap();
    assert!(fields.is_proofless_job);
    assert!(fields.proof_claims.is_empty());

    let response = job.prove().await.unwrap();
    assert!(response.is_proofless());
    assert_eq!(response.aggregated_proof, None);
    assert_eq!(response.aggregated_proof_public_input, None);
    assert_eq!(response.aggregated_verifier_index, None);
    assert_eq!(response.final_block_number, 102);
    assert_eq!(response.l2_merkle_roots.len(), 1);
}

#[test_log::test(tokio::test)]
async fn crafts_proven_response() {
    let job = simple_job();
    let fields = job.collect().await.unwrap();
    let claims = fields.proof_claims.clone();
    let public_input = AggregationPublicInput::new(&fields, L2_MSG_MERKLE_TREE_DEPTH);

    let response = craft_response(&job.config, fields, &DevProvingBackend).unwrap();
    assert_eq!(response.aggregated_verifier_index, Some(3));
    assert_eq!(
        response.aggregated_prover_version.as_deref(),
        Some("test-version")
    );
    assert_eq!(response.l2_merkle_trees_depth, 5);

    let digest = public_input.sum().unwrap();
    assert_eq!(
        response.aggregated_proof_public_input,
        Some(hex::encode_prefixed(digest))
    );
    let expected_proof = DevProvingBackend.prove(digest, &claims).unwrap();
    assert_eq!(
        response.aggregated_proof,
        Some(hex::encode_prefixed(expected_proof))
    );

    for value in [
        &response.final_shnarf,
        &response.parent_aggregation_final_shnarf,
        &response.parent_state_root_hash,
        &response.data_parent_hash,
        &response.l1_rolling_hash,
    ] {
        assert_eq!(hex::decode_prefixed(value).unwrap().len(), 32);
    }
    for hash in response.l2_merkle_roots.iter().chain(&response.data_hashes) {
        assert_eq!(hex::decode_prefixed(hash).unwrap().len(), 32);
    }
    assert_eq!(response.data_hashes.len(), 2);
}

fn upper_hash(byte: u8) -> String {
    format!("0x{}", format!("{byte:02X}").repeat(32))
}

#[test_log::test(tokio::test)]
async fn mixed_case_hashes_are_emitted_lowercase() {
    let mut job = Job::new();
    job.request.parent_aggregation_last_l1_rolling_hash = upper_hash(0xba);
    let mut first = execution(100, vec![with_event(block(1_001, &[]), &upper_hash(0xbc), 43)]);
    first.parent_state_root_hash = upper_hash(0xab);
    let mut batch = compression(0);
    batch.data_parent_hash = upper_hash(0xde);
    batch.prev_shnarf = upper_hash(0xce);
    batch.expected_shnarf = upper_hash(0xcd);
    batch.data_hash = upper_hash(0xdf);
    job.push_execution(&first).push_compression(&batch);

    let response = job.prove().await.unwrap();
    assert_eq!(response.parent_state_root_hash, hash(0xab));
    assert_eq!(response.l1_rolling_hash, hash(0xbc));
    assert_eq!(response.parent_aggregation_final_shnarf, hash(0xce));
    assert_eq!(response.final_shnarf, hash(0xcd));
    assert_eq!(response.data_parent_hash, hash(0xde));
    assert_eq!(response.data_hashes, [hash(0xdf)]);

    // The digest does not depend on the input casing.
    let mut lowercase = Job::new();
    lowercase.request.parent_aggregation_last_l1_rolling_hash = hash(0xba);
    let mut first = execution(100, vec![with_event(block(1_001, &[]), &hash(0xbc), 43)]);
    first.parent_state_root_hash = hash(0xab);
    let mut batch = compression(0);
    batch.data_parent_hash = hash(0xde);
    batch.prev_shnarf = hash(0xce);
    batch.expected_shnarf = hash(0xcd);
    batch.data_hash = hash(0xdf);
    lowercase.push_execution(&first).push_compression(&batch);
    assert_eq!(
        lowercase.prove().await.unwrap().aggregated_proof_public_input,
        response.aggregated_proof_public_input
    );
}

#[tokio::test]
async fn malformed_parent_rolling_hash_fails_validation() {
    let mut job = Job::new();
    job.request.parent_aggregation_last_l1_rolling_hash = "0x00".into();
    job.push_execution(&execution(
        100,
        vec![with_event(block(1_001, &[]), &hash(0xbc), 43)],
    ))
    .push_compression(&compression(0));

    let err = job.prove().await.unwrap_err();
    let AggregationError::Validation(errors) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_matches!(
        errors.errors(),
        [ValidationError::MalformedHex { field, .. }]
            if field == "parentAggregationLastL1RollingHash"
    );
}

#[tokio::test]
async fn proofless_job_still_validates_parent_rolling_hash() {
    let mut job = Job::new();
    job.request.parent_aggregation_last_l1_rolling_hash = "0x00".into();
    let mut first = execution(100, vec![with_event(block(1_001, &[]), &hash(0xbc), 43)]);
    first.prover_mode = ProverMode::Proofless;
    job.push_execution(&first).push_compression(&compression(0));

    assert_matches!(job.prove().await, Err(AggregationError::Validation(_)));
}

#[tokio::test]
async fn message_forest_spans_batches() {
    let mut job = Job::new();
    let messages: Vec<u8> = (0..20).collect();
    job.push_execution(&execution(1, vec![block(1_001, &messages)]))
        .push_execution(&execution(
            2,
            vec![block(1_002, &[]), block(1_003, &messages[..13])],
        ))
        .push_compression(&compression(0));

    let fields = job.collect().await.unwrap();
    assert_eq!(fields.how_many_l2_msgs, 33);
    assert_eq!(fields.l2_msg_root_hashes.len(), 2);
    assert_eq!(fields.l2_messaging_blocks_offsets, "0x00010003");
    assert_eq!(fields.last_finalized_block_number, 0);
}

#[tokio::test]
async fn no_messages_yield_no_roots() {
    let mut job = Job::new();
    job.push_execution(&execution(5, vec![block(1_001, &[]), block(1_002, &[])]))
        .push_compression(&compression(0));

    let fields = job.collect().await.unwrap();
    assert!(fields.l2_msg_root_hashes.is_empty());
    assert_eq!(fields.l2_messaging_blocks_offsets, "0x");
    job.prove().await.unwrap();
}

#[tokio::test]
async fn decode_error_names_the_response() {
    let mut job = simple_job();
    job.reader
        .insert("compression/1-compr.json", b"{\"dataHash\": 1}".to_vec());

    let err = job.collect().await.unwrap_err();
    assert_matches!(
        &err,
        AggregationError::Decode { path, .. } if path == Path::new("compression/1-compr.json")
    );
    assert!(err.to_string().contains("compression/1-compr.json"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn missing_response_is_a_read_error() {
    let mut job = simple_job();
    job.request.execution_proofs.push("missing.json".into());

    assert_matches!(
        job.collect().await,
        Err(AggregationError::Read { path, .. }) if path == Path::new("execution/missing.json")
    );
}

#[tokio::test]
async fn first_block_zero_is_rejected() {
    let mut job = Job::new();
    job.push_execution(&execution(0, vec![block(1_001, &[])]));

    assert_matches!(
        job.collect().await,
        Err(AggregationError::BlockRange {
            first_block_number: 0,
            ..
        })
    );
}

#[tokio::test]
async fn claim_errors_name_the_response() {
    let mut job = Job::new();
    let mut response = execution(100, vec![block(1_001, &[])]);
    response.verifying_key_sha_sum = String::new();
    job.push_execution(&response);

    assert_matches!(
        job.collect().await,
        Err(AggregationError::ProofClaim {
            path,
            source: ClaimDecodingError::EmptyVerifyingKeyShaSum,
        }) if path == Path::new("execution/0-exec.json")
    );
}

#[test_log::test(tokio::test)]
async fn validation_reports_every_failure() {
    let mut job = simple_job();
    job.request.parent_aggregation_last_block_timestamp = 5_000;
    let mut bad = compression(1);
    bad.expected_shnarf = "0x1234".into();
    bad.data_hash = "abcd".into();
    job.reader.insert(
        "compression/1-compr.json",
        serde_json::to_vec(&bad).unwrap(),
    );

    let err = job.prove().await.unwrap_err();
    let AggregationError::Validation(errors) = &err else {
        panic!("unexpected error: {err}");
    };
    let errors = errors.errors();
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert_matches!(
        &errors[0],
        ValidationError::MalformedHex { field, .. } if field == "finalShnarf"
    );
    assert_matches!(
        errors[1],
        ValidationError::TimestampsOutOfOrder {
            parent_timestamp: 5_000,
            final_timestamp: 1_003
        }
    );
    assert_matches!(
        &errors[2],
        ValidationError::MalformedHex {
            field,
            source: HexError::MissingPrefix,
            ..
        } if field == "dataHashes[1]"
    );
}

#[tokio::test]
async fn proving_failure_is_wrapped() {
    #[derive(Debug)]
    struct FailingBackend;

    impl ProvingBackend for FailingBackend {
        type Proof = ();

        fn decode_proof(&self, _bytes: &[u8]) -> anyhow::Result<()> {
            Ok(())
        }

        fn prove(
            &self,
            _public_input: B256,
            _claims: &[zkagg_prover_interface::ProofClaim<()>],
        ) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("circuit is not satisfied")
        }
    }

    let job = simple_job();
    let fields = collect_fields(&job.config, &job.request, &job.reader, &FailingBackend)
        .await
        .unwrap();
    let err = craft_response(&job.config, fields, &FailingBackend).unwrap_err();
    assert_matches!(err, AggregationError::Proving(_));
    assert!(err.to_string().contains("circuit is not satisfied"));
}
