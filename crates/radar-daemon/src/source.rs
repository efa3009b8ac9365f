//! File-backed snapshot source

use std::path::PathBuf;

use async_trait::async_trait;
use radar_compliance::{decode_snapshot, DataSource, Flight, MonitorError, MonitorResult};

/// Reads the flights document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSnapshotSource {
    async fn fetch(&self) -> MonitorResult<Vec<Flight>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            MonitorError::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        decode_snapshot(&bytes)
    }
}
