use std::collections::BTreeMap;

use crate::domain::NormalizedRecord;

/// Trait for augmenting a batch of normalized records with auxiliary data.
///
/// Implementations must keep record count and order intact; filtering belongs
/// to validation and deduplication.
pub trait Enricher: Send + Sync {
    fn enrich(&self, records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord>;
}

/// Default enricher: returns the batch unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityEnricher;

impl IdentityEnricher {
    pub fn new() -> Self {
        Self
    }
}

impl Enricher for IdentityEnricher {
    fn enrich(&self, records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        records
    }
}

/// Attaches the same reference attributes to every record.
/// Keys already present on a record are left untouched.
#[derive(Debug, Default, Clone)]
pub struct StaticAttributeEnricher {
    attributes: BTreeMap<String, String>,
}

impl StaticAttributeEnricher {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self { attributes }
    }
}

impl Enricher for StaticAttributeEnricher {
    fn enrich(&self, mut records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        for record in &mut records {
            for (key, value) in &self.attributes {
                record
                    .attributes
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        records
    }
}
