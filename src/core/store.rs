// src/core/store.rs

use crate::core::models::ScanRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Destination for finished records. Appends are fire-and-forget: a failing
/// store logs the problem itself and never reaches the scan response.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn append(&self, record: &ScanRecord);
}

/// Appends one JSON document per line to a history file.
pub struct JsonlScanStore {
    path: PathBuf,
    // Keeps concurrent appends from this process from interleaving.
    write_lock: Mutex<()>,
}

impl JsonlScanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn try_append(&self, record: &ScanRecord) -> std::io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl ScanStore for JsonlScanStore {
    async fn append(&self, record: &ScanRecord) {
        match self.try_append(record).await {
            Ok(()) => debug!(path = %self.path.display(), target = %record.target, "Scan record stored."),
            Err(e) => error!(path = %self.path.display(), error = %e, "Failed to store scan record."),
        }
    }
}
