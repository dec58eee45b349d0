use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use zkagg_aggregation::{AggregationError, FsResponseReader, prove_aggregation};
use zkagg_observability::{LogFormat, PrometheusExporter, Sentry, install_logs};
use zkagg_prover_interface::DevProvingBackend;
use zkagg_types::AggregationRequest;

use crate::config::Config;

mod config;
mod output;

/// Exit code used when the inputs of a job violate the sequencing invariant. Such a
/// job fails again on every retry.
const EXIT_CODE_INVARIANT_VIOLATION: u8 = 77;

#[derive(Debug, Parser)]
#[command(name = "zkagg-prover", version, about = "Aggregates execution and compression proofs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a single aggregation job
    Prove(ProveArgs),
}

#[derive(Debug, Args)]
struct ProveArgs {
    /// Aggregation request (JSON)
    #[arg(long)]
    request: PathBuf,
    /// Where to write the aggregated response (JSON)
    #[arg(long)]
    response: PathBuf,
    /// YAML config; `ZKAGG_`-prefixed environment variables take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { command } = Cli::parse();
    match command {
        Command::Prove(args) => run_prove(args).await,
    }
}

async fn run_prove(args: ProveArgs) -> ExitCode {
    let config = match config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let _sentry_guard = match init_observability(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize observability: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let (stop_sender, stop_receiver) = watch::channel(false);
    let exporter = config.observability.prometheus_port.map(|port| {
        tokio::spawn(PrometheusExporter::new(port).run(stop_receiver))
    });

    let result = prove(&config, &args).await;

    stop_sender.send_replace(true);
    if let Some(exporter) = exporter {
        match exporter.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("{err:#}"),
            Err(err) => tracing::warn!(%err, "Prometheus exporter task panicked"),
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let invariant_violation = err
                .downcast_ref::<AggregationError>()
                .is_some_and(|err| !err.is_recoverable());
            if invariant_violation {
                tracing::error!("aggregation inputs are inconsistent: {err:#}");
                ExitCode::from(EXIT_CODE_INVARIANT_VIOLATION)
            } else {
                tracing::error!("aggregation job failed: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

fn init_observability(config: &Config) -> anyhow::Result<Option<sentry::ClientInitGuard>> {
    let observability = &config.observability;
    let log_format: LogFormat = observability.log_format.parse()?;
    let sentry = observability
        .sentry_url
        .as_deref()
        .map(|url| {
            Sentry::new(url).map(|sentry| {
                sentry
                    .with_environment(observability.sentry_environment.clone())
                    .with_release(Some(config.aggregation.prover_version.clone()))
            })
        })
        .transpose()
        .context("invalid Sentry URL")?;

    install_logs(log_format, &observability.log_directives, sentry.as_ref())?;
    Ok(sentry.map(Sentry::install))
}

async fn prove(config: &Config, args: &ProveArgs) -> anyhow::Result<()> {
    let request_bytes = tokio::fs::read(&args.request)
        .await
        .with_context(|| format!("cannot read request {}", args.request.display()))?;
    let request: AggregationRequest = serde_json::from_slice(&request_bytes)
        .with_context(|| format!("cannot decode request {}", args.request.display()))?;
    tracing::info!(
        request = %args.request.display(),
        execution_proofs = request.execution_proofs.len(),
        compression_proofs = request.compression_proofs.len(),
        "starting aggregation job"
    );

    let response = prove_aggregation(
        &config.aggregation,
        &request,
        &FsResponseReader,
        &DevProvingBackend,
    )
    .await?;

    let contents = serde_json::to_vec_pretty(&response)?;
    output::write_atomically(&args.response, &contents)?;
    tracing::info!(
        response = %args.response.display(),
        first_block = response.last_finalized_block_number + 1,
        final_block = response.final_block_number,
        proofless = response.is_proofless(),
        "aggregation job finished"
    );
    Ok(())
}
