// Batch pipeline: stage implementations and the orchestrator running them

pub mod orchestrator;
pub mod processing;

pub use orchestrator::{BatchReport, PipelineOrchestrator, StageCounts};
