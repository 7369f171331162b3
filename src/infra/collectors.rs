use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::app::ports::Collector;
use crate::domain::RawRecord;
use crate::error::{PipelineError, Result};

/// Serves a fixed list of payloads, captured at collection time
pub struct InlineCollector {
    source_id: String,
    source_name: String,
    payloads: Vec<String>,
}

impl InlineCollector {
    pub fn new(source_id: impl Into<String>, source_name: impl Into<String>, payloads: Vec<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_name: source_name.into(),
            payloads,
        }
    }
}

#[async_trait]
impl Collector for InlineCollector {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn collect(&self) -> Result<Vec<RawRecord>> {
        let captured_at = Utc::now();
        Ok(self
            .payloads
            .iter()
            .map(|payload| RawRecord::new(payload.clone(), captured_at, &self.source_id, &self.source_name))
            .collect())
    }
}

/// Reads every regular file in a directory as one record, in file-name order
pub struct DirectoryCollector {
    source_id: String,
    source_name: String,
    path: PathBuf,
}

impl DirectoryCollector {
    pub fn new(source_id: impl Into<String>, source_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            source_name: source_name.into(),
            path: path.into(),
        }
    }

    fn io_error(&self, e: std::io::Error) -> PipelineError {
        PipelineError::collection(&self.source_id, format!("{}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl Collector for DirectoryCollector {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn collect(&self) -> Result<Vec<RawRecord>> {
        let mut entries = tokio::fs::read_dir(&self.path).await.map_err(|e| self.io_error(e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.io_error(e))? {
            let path = entry.path();
            // Follows symlinks, so a linked export counts as a regular file
            match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(source = %self.source_id, file = %path.display(), "Skipping dangling link");
                }
                Err(e) => return Err(self.io_error(e)),
            }
        }
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            match tokio::fs::read_to_string(&file).await {
                Ok(content) => {
                    debug!(source = %self.source_id, file = %file.display(), bytes = content.len(), "Read file");
                    records.push(RawRecord::new(content, Utc::now(), &self.source_id, &self.source_name));
                }
                // Binary files are not records; everything else aborts the batch
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(source = %self.source_id, file = %file.display(), "Skipping non UTF-8 file");
                }
                Err(e) => return Err(self.io_error(e)),
            }
        }

        Ok(records)
    }
}

/// Fetches one URL per batch; the response body becomes a single record
pub struct HttpCollector {
    source_id: String,
    source_name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpCollector {
    pub fn new(
        source_id: impl Into<String>,
        source_name: impl Into<String>,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            source_id: source_id.into(),
            source_name: source_name.into(),
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn collect(&self) -> Result<Vec<RawRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PipelineError::collection(&self.source_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::collection(
                &self.source_id,
                format!("GET {} returned {}", self.url, status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::collection(&self.source_id, e))?;
        debug!(source = %self.source_id, url = %self.url, bytes = body.len(), "Fetched payload");

        Ok(vec![RawRecord::new(body, Utc::now(), &self.source_id, &self.source_name)])
    }
}
