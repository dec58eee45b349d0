use smart_config::{DescribeConfig, DeserializeConfig};

#[derive(Clone, Debug, DescribeConfig, DeserializeConfig)]
#[config(derive(Default))]
pub struct ObservabilityConfig {
    /// Log output format: `plain`, `json` or `logfmt`
    #[config(default_t = "plain".into())]
    pub log_format: String,
    /// Default `tracing` filter directives, overridden by `RUST_LOG` when it is set
    #[config(default_t = "info".into())]
    pub log_directives: String,
    /// Sentry DSN; WARN and ERROR events are reported when set
    pub sentry_url: Option<String>,
    /// Environment reported to Sentry
    pub sentry_environment: Option<String>,
    /// Port to serve Prometheus metrics on while a job runs
    pub prometheus_port: Option<u16>,
}
