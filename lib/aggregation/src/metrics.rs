use std::time::Duration;

use vise::{Buckets, Counter, Histogram, Metrics, Unit};

const COUNT_BUCKETS: Buckets = Buckets::exponential(1.0..=4_096.0, 2.0);

#[derive(Debug, Metrics)]
#[metrics(prefix = "aggregation")]
pub struct AggregationMetrics {
    /// Number of execution responses folded into collected fields
    pub execution_responses: Counter,
    /// Number of compression responses folded into collected fields
    pub compression_responses: Counter,
    /// Number of L2-to-L1 messages per aggregation job
    #[metrics(buckets = COUNT_BUCKETS)]
    pub l2_messages: Histogram<usize>,
    /// Number of message trees per aggregation job
    #[metrics(buckets = COUNT_BUCKETS)]
    pub l2_message_trees: Histogram<usize>,
    /// Time spent reading and folding responses
    #[metrics(unit = Unit::Seconds, buckets = Buckets::LATENCIES)]
    pub collection_latency: Histogram<Duration>,
    /// Time spent in the proving backend
    #[metrics(unit = Unit::Seconds, buckets = Buckets::LATENCIES)]
    pub proving_latency: Histogram<Duration>,
    /// Jobs answered without an aggregated proof
    pub proofless_jobs: Counter,
}

#[vise::register]
pub(crate) static AGGREGATION_METRICS: vise::Global<AggregationMetrics> = vise::Global::new();
