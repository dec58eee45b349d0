use std::path::Path;

use anyhow::Context as _;

/// Source of the raw sub-proof responses of an aggregation job.
#[async_trait::async_trait]
pub trait ResponseReader: Send + Sync {
    async fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>>;
}

/// Reads responses from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResponseReader;

#[async_trait::async_trait]
impl ResponseReader for FsResponseReader {
    async fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read response file {}", path.display()))
    }
}
