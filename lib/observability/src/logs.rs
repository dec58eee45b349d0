use std::str::FromStr;

use anyhow::Context as _;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::Layered, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::Sentry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
    Logfmt,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format `{0}`, expected one of `plain`, `json` or `logfmt`")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "logfmt" => Ok(Self::Logfmt),
            other => Err(UnknownLogFormat(other.to_owned())),
        }
    }
}

type FilteredRegistry = Layered<EnvFilter, Registry>;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `directives` when it is set.
pub fn install_logs(
    format: LogFormat,
    directives: &str,
    sentry: Option<&Sentry>,
) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log directives `{directives}`"))?,
    };

    let fmt_layer: Box<dyn Layer<FilteredRegistry> + Send + Sync> = match format {
        LogFormat::Plain => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Logfmt => tracing_logfmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(sentry.map(|sentry| sentry.layer()))
        .try_init()
        .context("failed to install the tracing subscriber")
}
