//! Batch pipeline for heterogeneous business records.
//!
//! Raw records from configured sources go through validate, transform, enrich
//! and deduplicate; the result is persisted and a completion event is published
//! on an in-process [`events::EventBus`].

pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod events;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;

pub use domain::{NormalizedRecord, RawRecord, SourceFormat};
pub use error::{PipelineError, Result};
pub use events::{Event, EventBus};
pub use pipeline::{BatchReport, PipelineOrchestrator, StageCounts};
