use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context as _;
use tokio::sync::watch;
use vise_exporter::MetricsExporter;

/// Serves the metrics registered with `vise` over HTTP until stopped.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusExporter {
    port: u16,
}

impl PrometheusExporter {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub async fn run(self, mut stop_receiver: watch::Receiver<bool>) -> anyhow::Result<()> {
        let exporter = MetricsExporter::default().with_graceful_shutdown(async move {
            stop_receiver.changed().await.ok();
        });
        let bind_address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port));
        tracing::info!(%bind_address, "serving Prometheus metrics");
        exporter
            .start(bind_address)
            .await
            .with_context(|| format!("Prometheus exporter on {bind_address} failed"))
    }
}
