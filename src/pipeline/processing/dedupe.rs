use std::collections::HashSet;

use crate::domain::NormalizedRecord;

/// Collapses a batch to one record per `system_id`.
///
/// The first record seen for a key wins and the survivors keep their original
/// relative order. Fields are never merged across duplicates.
#[derive(Debug, Default, Clone, Copy)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    pub fn deduplicate(&self, records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        records
            .into_iter()
            .filter(|record| seen.insert(record.system_id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceFormat;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn record(system_id: &str, value: f64) -> NormalizedRecord {
        NormalizedRecord {
            system_id: system_id.to_string(),
            category: "file".to_string(),
            value,
            source_raw_record_id: Uuid::new_v4(),
            transformed_at: Utc::now(),
            source_format: SourceFormat::Csv,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let batch = vec![record("A", 1.0), record("B", 2.0), record("A", 3.0), record("C", 4.0), record("B", 5.0)];

        let deduped = Deduplicator::new().deduplicate(batch);

        let keys: Vec<&str> = deduped.iter().map(|r| r.system_id.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(deduped[0].value, 1.0);
        assert_eq!(deduped[1].value, 2.0);
    }

    #[test]
    fn test_idempotent() {
        let batch = vec![record("A", 1.0), record("A", 2.0), record("B", 3.0)];
        let dedupe = Deduplicator::new();

        let once = dedupe.deduplicate(batch);
        let twice = dedupe.deduplicate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_output_keys_unique_and_never_longer() {
        let batch: Vec<_> = (0..50).map(|i| record(&format!("K{}", i % 7), i as f64)).collect();
        let input_len = batch.len();

        let deduped = Deduplicator::new().deduplicate(batch);

        assert!(deduped.len() <= input_len);
        let unique: HashSet<_> = deduped.iter().map(|r| r.system_id.clone()).collect();
        assert_eq!(unique.len(), deduped.len());
        assert_eq!(deduped.len(), 7);
    }

    #[test]
    fn test_empty_batch() {
        assert!(Deduplicator::new().deduplicate(Vec::new()).is_empty());
    }
}
