use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::events::{Event, EventBus};

/// Writes a JSON summary file for every completed batch.
///
/// Stands in for the report generator: it only reacts to the completion event
/// and never talks to the orchestrator directly.
#[derive(Debug, Clone)]
pub struct BatchReportWriter {
    dir: PathBuf,
}

impl BatchReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Register on `bus` for `event_name`
    pub fn subscribe(self, bus: &EventBus, event_name: &str) {
        bus.subscribe(event_name, move |event| self.handle(event));
    }

    pub fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let Event::BatchCompleted(payload) = event else {
            // Signals carry nothing to report on
            return Ok(());
        };

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("batch-{}.json", payload.batch_id));
        fs::write(&path, serde_json::to_vec_pretty(payload)?)?;

        info!(path = %path.display(), batch_id = %payload.batch_id, "Wrote batch report");
        Ok(())
    }
}
