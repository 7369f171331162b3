//! Record shapes flowing through the batch pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// An unvalidated unit of input exactly as a collector produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: Uuid,
    /// Text payload in whatever format the source emits
    pub content: String,
    /// When the collector captured the payload
    pub captured_at: DateTime<Utc>,
    pub source_id: String,
    pub source_name: String,
}

impl RawRecord {
    pub fn new(
        content: impl Into<String>,
        captured_at: DateTime<Utc>,
        source_id: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            captured_at,
            source_id: source_id.into(),
            source_name: source_name.into(),
        }
    }
}

/// Payload format guessed from the leading characters of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceFormat {
    Json,
    Xml,
    Csv,
    Text,
    Unknown,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Json => "JSON",
            SourceFormat::Xml => "XML",
            SourceFormat::Csv => "CSV",
            SourceFormat::Text => "TEXT",
            SourceFormat::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pipeline's uniform, format-agnostic output shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Deduplication key identifying the producing subsystem
    pub system_id: String,
    pub category: String,
    pub value: f64,
    /// Back-reference to the raw record this was built from
    pub source_raw_record_id: Uuid,
    pub transformed_at: DateTime<Utc>,
    pub source_format: SourceFormat,
    /// Auxiliary fields attached by enrichers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}
