//! Transform stage: raw record to normalized record.
//!
//! Format detection picks a [`FormatNormalizer`] from the [`FormatRegistry`];
//! the transformer then stamps lineage, time and detected format on the result.

pub mod format;
pub mod normalizers;
pub mod registry;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::DEFAULT_VALUE;
use crate::domain::{NormalizedRecord, RawRecord};

pub use format::detect_format;
pub use normalizers::{FormatExtraction, FormatNormalizer, TaggedNormalizer};
pub use registry::FormatRegistry;

static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?").expect("numeric token pattern is valid")
});

/// First decimal-looking token in `content`, or [`DEFAULT_VALUE`] when there is
/// none or it does not parse.
pub fn extract_value(content: &str) -> f64 {
    match NUMERIC_TOKEN.find(content) {
        Some(token) => match token.as_str().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => DEFAULT_VALUE,
        },
        None => DEFAULT_VALUE,
    }
}

/// Converts validated raw records into normalized records
pub struct Transformer {
    registry: FormatRegistry,
}

impl Transformer {
    pub fn new() -> Self {
        Self::with_registry(FormatRegistry::new())
    }

    pub fn with_registry(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    /// Transform one record. Callers must only pass records that passed validation.
    pub fn transform(&self, record: &RawRecord) -> NormalizedRecord {
        let source_format = detect_format(&record.content);
        let extraction = self.registry.extract(source_format, record);

        NormalizedRecord {
            system_id: extraction.system_id,
            category: extraction.category,
            value: extraction.value,
            source_raw_record_id: record.id,
            transformed_at: Utc::now(),
            source_format,
            attributes: Default::default(),
        }
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}
