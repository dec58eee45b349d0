//! Observability of the aggregation prover: log formatting and filtering, the
//! optional Sentry layer and the Prometheus exporter.

mod config;
pub use config::ObservabilityConfig;

mod logs;
pub use logs::{LogFormat, UnknownLogFormat, install_logs};

mod prometheus;
pub use prometheus::PrometheusExporter;

mod sentry;
pub use self::sentry::Sentry;
