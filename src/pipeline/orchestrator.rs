use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::app::ports::{Collector, Sink};
use crate::constants::BATCH_COMPLETED_EVENT;
use crate::domain::{NormalizedRecord, RawRecord};
use crate::error::Result;
use crate::events::{BatchCompleted, Event, EventBus};
use crate::observability::metrics;
use crate::pipeline::processing::{
    Deduplicator, DefaultValidator, Enricher, IdentityEnricher, Transformer, Validator,
};

/// Record counts observed at each stage boundary of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub collected: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub transformed: usize,
    pub enriched: usize,
    /// Records left after deduplication
    pub deduplicated: usize,
}

/// Result of one `execute_batch` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub pipeline_name: String,
    pub counts: StageCounts,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

/// Runs validate, transform, enrich and deduplicate over one batch.
///
/// Each stage consumes the complete output of the previous one and the input
/// order is preserved up to deduplication, which keeps the first record per key.
pub struct PipelineOrchestrator {
    name: String,
    completion_event: String,
    validator: Box<dyn Validator>,
    transformer: Transformer,
    enricher: Box<dyn Enricher>,
    deduplicator: Deduplicator,
    collectors: Vec<Arc<dyn Collector>>,
    sink: Arc<dyn Sink>,
    bus: Arc<EventBus>,
}

impl PipelineOrchestrator {
    /// Orchestrator with the default stages and no collectors
    pub fn new(name: impl Into<String>, sink: Arc<dyn Sink>, bus: Arc<EventBus>) -> Self {
        Self {
            name: name.into(),
            completion_event: BATCH_COMPLETED_EVENT.to_string(),
            validator: Box::new(DefaultValidator::new()),
            transformer: Transformer::new(),
            enricher: Box::new(IdentityEnricher::new()),
            deduplicator: Deduplicator::new(),
            collectors: Vec::new(),
            sink,
            bus,
        }
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_enricher(mut self, enricher: Box<dyn Enricher>) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_completion_event(mut self, event_name: impl Into<String>) -> Self {
        self.completion_event = event_name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn completion_event(&self) -> &str {
        &self.completion_event
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Run the four stages over `raw` and return the final batch
    pub fn run_pipeline(&self, raw: Vec<RawRecord>) -> Vec<NormalizedRecord> {
        self.run_stages(raw).0
    }

    /// Same as [`run_pipeline`](Self::run_pipeline) but also reports per-stage counts
    pub fn run_stages(&self, raw: Vec<RawRecord>) -> (Vec<NormalizedRecord>, StageCounts) {
        let mut counts = StageCounts {
            collected: raw.len(),
            ..Default::default()
        };

        let accepted: Vec<RawRecord> = raw
            .into_iter()
            .filter(|record| self.validator.validate(record))
            .collect();
        counts.accepted = accepted.len();
        counts.rejected = counts.collected - counts.accepted;
        info!(
            collected = counts.collected,
            accepted = counts.accepted,
            rejected = counts.rejected,
            "Validation complete"
        );

        let transformed: Vec<NormalizedRecord> = accepted
            .iter()
            .map(|record| self.transformer.transform(record))
            .collect();
        counts.transformed = transformed.len();

        let enriched = self.enricher.enrich(transformed);
        counts.enriched = enriched.len();

        let unique = self.deduplicator.deduplicate(enriched);
        counts.deduplicated = unique.len();
        info!(
            before = counts.enriched,
            after = counts.deduplicated,
            "Deduplication complete"
        );

        metrics::pipeline::records_collected(counts.collected);
        metrics::pipeline::records_accepted(counts.accepted);
        metrics::pipeline::records_rejected(counts.rejected);
        metrics::pipeline::records_deduplicated(counts.enriched - counts.deduplicated);

        (unique, counts)
    }

    /// Collect from every configured source, run the stages, persist the result
    /// and publish the completion event.
    ///
    /// Collection and persistence failures are logged and returned; there is no
    /// retry. Handler outcomes of the completion event are not inspected.
    pub async fn execute_batch(&self) -> Result<BatchReport> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", %batch_id, pipeline = %self.name);
        self.execute_batch_inner(batch_id).instrument(span).await
    }

    async fn execute_batch_inner(&self, batch_id: Uuid) -> Result<BatchReport> {
        let started_at = Utc::now();
        info!(sources = self.collectors.len(), "Starting batch");

        let raw = self.collect_all().await.map_err(|e| {
            error!(error = %e, "Batch aborted during collection");
            metrics::pipeline::batch_failed("collect");
            e
        })?;

        let (records, counts) = self.run_stages(raw);

        self.sink.persist(&records).await.map_err(|e| {
            error!(error = %e, records = records.len(), "Batch aborted during persistence");
            metrics::pipeline::batch_failed("persist");
            e
        })?;
        metrics::pipeline::records_persisted(records.len());

        let completed_at = Utc::now();
        let event = Event::BatchCompleted(BatchCompleted {
            event_name: self.completion_event.clone(),
            batch_id,
            pipeline_name: self.name.clone(),
            counts,
            completed_at,
        });
        self.bus.publish(&event);

        let report = BatchReport {
            batch_id,
            pipeline_name: self.name.clone(),
            counts,
            started_at,
            completed_at,
        };
        let secs = report.duration().num_milliseconds() as f64 / 1000.0;
        metrics::pipeline::batch_completed(secs);
        info!(output = counts.deduplicated, duration_secs = secs, "Batch completed");

        Ok(report)
    }

    /// Results are concatenated in collector order regardless of completion order
    async fn collect_all(&self) -> Result<Vec<RawRecord>> {
        let batches = try_join_all(self.collectors.iter().map(|collector| async move {
            let records = collector.collect().await.map_err(|e| {
                error!(source = collector.source_id(), error = %e, "Collector failed");
                e
            })?;
            info!(source = collector.source_id(), count = records.len(), "Collected records");
            Ok::<_, crate::error::PipelineError>(records)
        }))
        .await?;

        Ok(batches.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CSV_SYSTEM_ID, JSON_SYSTEM_ID};
    use crate::domain::SourceFormat;
    use crate::error::PipelineError;
    use crate::infra::{InMemorySink, InlineCollector};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn raw(content: &str) -> RawRecord {
        RawRecord::new(content, Utc::now(), "crm", "CRM")
    }

    fn orchestrator(sink: Arc<dyn Sink>) -> PipelineOrchestrator {
        PipelineOrchestrator::new("test", sink, Arc::new(EventBus::new()))
    }

    struct FailingCollector;

    #[async_trait]
    impl Collector for FailingCollector {
        fn source_id(&self) -> &str {
            "broken"
        }

        async fn collect(&self) -> Result<Vec<RawRecord>> {
            Err(PipelineError::collection("broken", "connection refused"))
        }
    }

    struct FailingSink;

    #[async_trait]
    impl Sink for FailingSink {
        async fn persist(&self, _records: &[NormalizedRecord]) -> Result<()> {
            Err(PipelineError::Persistence("disk full".to_string()))
        }
    }

    #[test]
    fn test_mixed_batch_drops_empty_record() {
        let pipeline = orchestrator(Arc::new(InMemorySink::new()));
        let batch = vec![raw("{\"total\": 10}"), raw("id,total\n1,10"), raw("")];

        let output = pipeline.run_pipeline(batch);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].source_format, SourceFormat::Json);
        assert_eq!(output[0].system_id, JSON_SYSTEM_ID);
        assert_eq!(output[1].source_format, SourceFormat::Csv);
        assert_eq!(output[1].system_id, CSV_SYSTEM_ID);
    }

    #[test]
    fn test_output_references_validated_inputs() {
        let pipeline = orchestrator(Arc::new(InMemorySink::new()));
        let valid = raw("<order>3</order>");
        let mut stale = raw("{\"a\": 1}");
        stale.captured_at = DateTime::<Utc>::UNIX_EPOCH;

        let output = pipeline.run_pipeline(vec![stale, valid.clone()]);

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].source_raw_record_id, valid.id);
    }

    #[test]
    fn test_stage_counts_and_unique_keys() {
        let pipeline = orchestrator(Arc::new(InMemorySink::new()));
        let batch = vec![
            raw("{\"a\": 5}"),
            raw("{\"a\": 2}"),
            raw("   "),
            raw("plain text"),
            raw("more text 7"),
        ];

        let (output, counts) = pipeline.run_stages(batch);

        assert_eq!(
            counts,
            StageCounts { collected: 5, accepted: 4, rejected: 1, transformed: 4, enriched: 4, deduplicated: 2 }
        );
        let keys: HashSet<_> = output.iter().map(|r| r.system_id.clone()).collect();
        assert_eq!(keys.len(), output.len());
        // first seen wins
        assert_eq!(output[0].value, 5.0);
    }

    #[tokio::test]
    async fn test_execute_batch_persists_and_publishes() {
        let sink = Arc::new(InMemorySink::new());
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let recorder = seen.clone();
        bus.subscribe(BATCH_COMPLETED_EVENT, move |event| {
            if let Event::BatchCompleted(payload) = event {
                recorder.lock().unwrap().push(payload.counts);
            }
            Ok(())
        });

        let collector = InlineCollector::new(
            "crm",
            "CRM",
            vec!["{\"total\": 4}".to_string(), "a,b\n1,2".to_string()],
        );
        let pipeline = PipelineOrchestrator::new("nightly", sink.clone(), bus.clone())
            .with_collector(Arc::new(collector));

        let report = pipeline.execute_batch().await.unwrap();

        assert_eq!(report.counts.deduplicated, 2);
        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.batch_count(), 1);
        assert_eq!(seen.lock().unwrap().as_slice(), &[report.counts]);
        assert_eq!(bus.stats(BATCH_COMPLETED_EVENT).publish_count, 1);
    }

    #[tokio::test]
    async fn test_collection_failure_aborts_batch() {
        let sink = Arc::new(InMemorySink::new());
        let bus = Arc::new(EventBus::new());
        let pipeline = PipelineOrchestrator::new("nightly", sink.clone(), bus.clone())
            .with_collector(Arc::new(InlineCollector::new("ok", "OK", vec!["x 1".to_string()])))
            .with_collector(Arc::new(FailingCollector));

        let err = pipeline.execute_batch().await.unwrap_err();

        assert!(matches!(err, PipelineError::Collection { ref source_id, .. } if source_id == "broken"));
        assert_eq!(sink.batch_count(), 0);
        assert_eq!(bus.stats(BATCH_COMPLETED_EVENT).publish_count, 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_skips_completion_event() {
        let bus = Arc::new(EventBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        bus.subscribe(BATCH_COMPLETED_EVENT, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let pipeline = PipelineOrchestrator::new("nightly", Arc::new(FailingSink), bus)
            .with_collector(Arc::new(InlineCollector::new("crm", "CRM", vec!["x".to_string()])));

        let err = pipeline.execute_batch().await.unwrap_err();

        assert!(matches!(err, PipelineError::Persistence(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_fail_batch() {
        let bus = Arc::new(EventBus::new());
        bus.subscribe("custom-done", |_| Err(anyhow::anyhow!("report renderer offline")));
        let pipeline = PipelineOrchestrator::new("nightly", Arc::new(InMemorySink::new()), bus.clone())
            .with_completion_event("custom-done");

        let report = pipeline.execute_batch().await.unwrap();

        assert_eq!(report.counts, StageCounts::default());
        assert_eq!(bus.stats("custom-done").error_count, 1);
    }
}
