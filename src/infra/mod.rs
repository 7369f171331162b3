// Adapters behind the collector and sink ports, plus event consumers

pub mod collectors;
pub mod factory;
pub mod report;
pub mod sinks;

pub use collectors::{DirectoryCollector, HttpCollector, InlineCollector};
pub use report::BatchReportWriter;
pub use sinks::{InMemorySink, JsonLinesSink};
