//! Metrics for the batch pipeline and event bus
//!
//! Recording goes through the `metrics` facade; nothing is exported until
//! [`init`] installs the Prometheus recorder, so library users and tests pay
//! nothing by default.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

/// All metric names used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Pipeline stage metrics
    RecordsCollected,
    RecordsAccepted,
    RecordsRejected,
    RecordsDeduplicated,
    RecordsPersisted,
    BatchesCompleted,
    BatchesFailed,
    BatchDuration,

    // Event bus metrics
    EventsPublished,
    EventHandlerFailures,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RecordsCollected => "bizdata_pipeline_records_collected_total",
            MetricName::RecordsAccepted => "bizdata_pipeline_records_accepted_total",
            MetricName::RecordsRejected => "bizdata_pipeline_records_rejected_total",
            MetricName::RecordsDeduplicated => "bizdata_pipeline_records_deduplicated_total",
            MetricName::RecordsPersisted => "bizdata_pipeline_records_persisted_total",
            MetricName::BatchesCompleted => "bizdata_pipeline_batches_completed_total",
            MetricName::BatchesFailed => "bizdata_pipeline_batches_failed_total",
            MetricName::BatchDuration => "bizdata_batch_duration_seconds",
            MetricName::EventsPublished => "bizdata_events_published_total",
            MetricName::EventHandlerFailures => "bizdata_events_handler_failures_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is an error from the exporter.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    PROMETHEUS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Render current metrics in Prometheus text format, if the recorder is installed
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

pub mod pipeline {
    use super::MetricName;

    pub fn records_collected(count: usize) {
        ::metrics::counter!(MetricName::RecordsCollected.as_str()).increment(count as u64);
    }

    pub fn records_accepted(count: usize) {
        ::metrics::counter!(MetricName::RecordsAccepted.as_str()).increment(count as u64);
    }

    pub fn records_rejected(count: usize) {
        ::metrics::counter!(MetricName::RecordsRejected.as_str()).increment(count as u64);
    }

    /// Records dropped as duplicates
    pub fn records_deduplicated(count: usize) {
        ::metrics::counter!(MetricName::RecordsDeduplicated.as_str()).increment(count as u64);
    }

    pub fn records_persisted(count: usize) {
        ::metrics::counter!(MetricName::RecordsPersisted.as_str()).increment(count as u64);
    }

    pub fn batch_completed(secs: f64) {
        ::metrics::counter!(MetricName::BatchesCompleted.as_str()).increment(1);
        ::metrics::histogram!(MetricName::BatchDuration.as_str()).record(secs);
    }

    pub fn batch_failed(stage: &'static str) {
        ::metrics::counter!(MetricName::BatchesFailed.as_str(), "stage" => stage).increment(1);
    }
}

pub mod events {
    use super::MetricName;

    pub fn published(event_name: &str) {
        ::metrics::counter!(MetricName::EventsPublished.as_str(), "event" => event_name.to_string())
            .increment(1);
    }

    pub fn handler_failed(event_name: &str) {
        ::metrics::counter!(MetricName::EventHandlerFailures.as_str(), "event" => event_name.to_string())
            .increment(1);
    }
}
