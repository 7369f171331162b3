use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::events::EventBus;
use crate::infra::factory::{collector_for, sink_for};
use crate::infra::BatchReportWriter;
use crate::pipeline::processing::{Enricher, IdentityEnricher, StaticAttributeEnricher};
use crate::pipeline::{BatchReport, PipelineOrchestrator};

/// Use case wiring a configured pipeline and running one batch through it
pub struct BatchUseCase {
    orchestrator: PipelineOrchestrator,
}

impl BatchUseCase {
    /// Build collectors, sink, enricher and event consumers from `config`.
    /// The bus is owned by the caller so other components can subscribe to it.
    pub fn from_config(config: &PipelineConfig, bus: Arc<EventBus>) -> Result<Self> {
        let sink = sink_for(&config.sink);

        let enricher: Box<dyn Enricher> = if config.enrich.attributes.is_empty() {
            Box::new(IdentityEnricher::new())
        } else {
            Box::new(StaticAttributeEnricher::new(config.enrich.attributes.clone()))
        };

        let mut orchestrator = PipelineOrchestrator::new(&config.pipeline.name, sink, bus.clone())
            .with_enricher(enricher)
            .with_completion_event(&config.pipeline.completion_event);

        for source in &config.sources {
            let collector = collector_for(source)
                .with_context(|| format!("Failed to build collector for source '{}'", source.id))?;
            orchestrator = orchestrator.with_collector(collector);
        }

        if let Some(dir) = &config.report.dir {
            BatchReportWriter::new(dir).subscribe(&bus, &config.pipeline.completion_event);
            info!(dir = %dir.display(), "Batch reports enabled");
        }

        Ok(Self { orchestrator })
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }

    pub async fn run(&self) -> Result<BatchReport> {
        let report = self
            .orchestrator
            .execute_batch()
            .await
            .with_context(|| format!("Batch '{}' failed", self.orchestrator.name()))?;
        Ok(report)
    }
}
