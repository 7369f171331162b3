//! In-process publish/subscribe used to decouple "batch finished" from whatever
//! consumes it (report generation and the like).

pub mod bus;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::StageCounts;

pub use bus::{EventBus, EventHandler, EventStats, PublishSummary};

/// Payload of the batch completion event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCompleted {
    /// Name the event is published under, as configured for the pipeline
    pub event_name: String,
    pub batch_id: Uuid,
    pub pipeline_name: String,
    pub counts: StageCounts,
    pub completed_at: DateTime<Utc>,
}

/// Something published on the bus. The routing key is [`Event::name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    BatchCompleted(BatchCompleted),
    /// Named event with no payload
    Signal { name: String },
}

impl Event {
    pub fn signal(name: impl Into<String>) -> Self {
        Event::Signal { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Event::BatchCompleted(payload) => &payload.event_name,
            Event::Signal { name } => name,
        }
    }
}
