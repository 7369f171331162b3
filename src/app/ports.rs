use async_trait::async_trait;

use crate::domain::{NormalizedRecord, RawRecord};
use crate::error::Result;

/// One configured input source. A failing collector aborts the whole batch.
#[async_trait]
pub trait Collector: Send + Sync {
    fn source_id(&self) -> &str;
    async fn collect(&self) -> Result<Vec<RawRecord>>;
}

/// Destination for the final normalized batch, called once per batch
#[async_trait]
pub trait Sink: Send + Sync {
    async fn persist(&self, records: &[NormalizedRecord]) -> Result<()>;
}
