use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use crate::app::ports::Sink;
use crate::domain::NormalizedRecord;
use crate::error::{PipelineError, Result};

/// Keeps every persisted batch in memory, for dry runs and tests
#[derive(Default)]
pub struct InMemorySink {
    batches: Mutex<Vec<Vec<NormalizedRecord>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted records, oldest batch first
    pub fn records(&self) -> Vec<NormalizedRecord> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn persist(&self, records: &[NormalizedRecord]) -> Result<()> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(records.to_vec());
        debug!(records = records.len(), "Stored batch in memory");
        Ok(())
    }
}

/// Writes each batch as JSON lines, replacing the previous file.
///
/// The batch is serialized fully before the file is touched, so a serialization
/// failure leaves the previous output in place.
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn persistence_error(&self, e: impl std::fmt::Display) -> PipelineError {
        PipelineError::Persistence(format!("{}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl Sink for JsonLinesSink {
    async fn persist(&self, records: &[NormalizedRecord]) -> Result<()> {
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persistence_error(e))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| self.persistence_error(e))?;

        info!(path = %self.path.display(), records = records.len(), "Wrote normalized batch");
        Ok(())
    }
}
