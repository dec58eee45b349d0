use std::path::PathBuf;

use smart_config::{DescribeConfig, DeserializeConfig};

#[derive(Clone, Debug, DescribeConfig, DeserializeConfig)]
#[config(derive(Default))]
pub struct AggregationConfig {
    /// Index of the recursive verifier the aggregated proof is produced for
    #[config(default_t = 0)]
    pub verifier_id: u64,
    /// Version string reported in the aggregated response
    #[config(default_t = env!("CARGO_PKG_VERSION").into())]
    pub prover_version: String,
    /// Directory execution response paths of a request are relative to
    #[config(default_t = "./prover-assets/execution/responses".into())]
    pub execution_responses_dir: PathBuf,
    /// Directory compression response paths of a request are relative to
    #[config(default_t = "./prover-assets/compression/responses".into())]
    pub compression_responses_dir: PathBuf,
    /// Maximum number of response files read ahead of the fold. `0` is treated as `1`.
    #[config(default_t = 8)]
    pub read_concurrency: usize,
}

impl AggregationConfig {
    pub(crate) fn effective_read_concurrency(&self) -> usize {
        self.read_concurrency.max(1)
    }
}
