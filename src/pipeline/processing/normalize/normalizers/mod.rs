use crate::constants::{
    CSV_CATEGORY, CSV_SYSTEM_ID, GENERIC_CATEGORY, GENERIC_SYSTEM_ID, JSON_CATEGORY,
    JSON_SYSTEM_ID, XML_CATEGORY, XML_SYSTEM_ID,
};
use crate::domain::RawRecord;

use super::extract_value;

/// Fields a format-specific normalizer derives from a raw payload.
/// Lineage and timestamps are stamped afterwards by the transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatExtraction {
    pub system_id: String,
    pub category: String,
    pub value: f64,
}

/// Per-format extraction strategy
pub trait FormatNormalizer: Send + Sync {
    fn extract(&self, record: &RawRecord) -> FormatExtraction;
}

/// Tags every record with a fixed system id and category and pulls the first
/// numeric token out of the content.
#[derive(Debug, Clone)]
pub struct TaggedNormalizer {
    system_id: &'static str,
    category: &'static str,
}

impl TaggedNormalizer {
    pub const fn new(system_id: &'static str, category: &'static str) -> Self {
        Self { system_id, category }
    }

    pub const fn json() -> Self {
        Self::new(JSON_SYSTEM_ID, JSON_CATEGORY)
    }

    pub const fn csv() -> Self {
        Self::new(CSV_SYSTEM_ID, CSV_CATEGORY)
    }

    pub const fn xml() -> Self {
        Self::new(XML_SYSTEM_ID, XML_CATEGORY)
    }

    /// Fallback for text and anything unclassified
    pub const fn generic() -> Self {
        Self::new(GENERIC_SYSTEM_ID, GENERIC_CATEGORY)
    }
}

impl FormatNormalizer for TaggedNormalizer {
    fn extract(&self, record: &RawRecord) -> FormatExtraction {
        FormatExtraction {
            system_id: self.system_id.to_string(),
            category: self.category.to_string(),
            value: extract_value(&record.content),
        }
    }
}
