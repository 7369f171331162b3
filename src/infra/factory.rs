use std::sync::Arc;
use std::time::Duration;

use super::collectors::{DirectoryCollector, HttpCollector, InlineCollector};
use super::sinks::{InMemorySink, JsonLinesSink};
use crate::app::ports::{Collector, Sink};
use crate::config::{SinkConfig, SourceConfig, SourceKind};
use crate::error::Result;

/// Build the collector described by one `[[sources]]` entry
pub fn collector_for(source: &SourceConfig) -> Result<Arc<dyn Collector>> {
    let name = source.display_name();
    let collector: Arc<dyn Collector> = match &source.kind {
        SourceKind::Inline { records } => {
            Arc::new(InlineCollector::new(&source.id, name, records.clone()))
        }
        SourceKind::Directory { path } => {
            Arc::new(DirectoryCollector::new(&source.id, name, path.clone()))
        }
        SourceKind::Http { url, timeout_secs } => Arc::new(HttpCollector::new(
            &source.id,
            name,
            url.clone(),
            Duration::from_secs(*timeout_secs),
        )?),
    };
    Ok(collector)
}

pub fn sink_for(config: &SinkConfig) -> Arc<dyn Sink> {
    match config {
        SinkConfig::Memory => Arc::new(InMemorySink::new()),
        SinkConfig::JsonLines { path } => Arc::new(JsonLinesSink::new(path.clone())),
    }
}
