use std::collections::HashMap;

use super::normalizers::{FormatExtraction, FormatNormalizer, TaggedNormalizer};
use crate::domain::{RawRecord, SourceFormat};

/// Dispatch table from detected format to its extraction strategy
pub struct FormatRegistry {
    normalizers: HashMap<SourceFormat, Box<dyn FormatNormalizer>>,
    fallback: Box<dyn FormatNormalizer>,
}

impl FormatRegistry {
    /// Create a registry with the built-in normalizers
    pub fn new() -> Self {
        let mut normalizers: HashMap<SourceFormat, Box<dyn FormatNormalizer>> = HashMap::new();

        normalizers.insert(SourceFormat::Json, Box::new(TaggedNormalizer::json()));
        normalizers.insert(SourceFormat::Csv, Box::new(TaggedNormalizer::csv()));
        normalizers.insert(SourceFormat::Xml, Box::new(TaggedNormalizer::xml()));
        normalizers.insert(SourceFormat::Text, Box::new(TaggedNormalizer::generic()));

        Self {
            normalizers,
            fallback: Box::new(TaggedNormalizer::generic()),
        }
    }

    /// Replace the normalizer used for a format
    pub fn register(&mut self, format: SourceFormat, normalizer: Box<dyn FormatNormalizer>) {
        self.normalizers.insert(format, normalizer);
    }

    /// Get the normalizer for a format, falling back to the generic one
    pub fn get_normalizer(&self, format: SourceFormat) -> &dyn FormatNormalizer {
        self.normalizers
            .get(&format)
            .map(|n| n.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn extract(&self, format: SourceFormat, record: &RawRecord) -> FormatExtraction {
        self.get_normalizer(format).extract(record)
    }

    pub fn registered_formats(&self) -> Vec<SourceFormat> {
        self.normalizers.keys().copied().collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GENERIC_SYSTEM_ID, JSON_SYSTEM_ID};
    use chrono::Utc;

    struct FixedNormalizer;

    impl FormatNormalizer for FixedNormalizer {
        fn extract(&self, _record: &RawRecord) -> FormatExtraction {
            FormatExtraction {
                system_id: "ERP_FEED".to_string(),
                category: "erp".to_string(),
                value: 42.0,
            }
        }
    }

    #[test]
    fn test_registry_has_built_in_normalizers() {
        let registry = FormatRegistry::new();
        let formats = registry.registered_formats();

        assert!(formats.contains(&SourceFormat::Json));
        assert!(formats.contains(&SourceFormat::Csv));
        assert!(formats.contains(&SourceFormat::Xml));
        assert!(formats.contains(&SourceFormat::Text));
    }

    #[test]
    fn test_unknown_format_uses_fallback() {
        let registry = FormatRegistry::new();
        let record = RawRecord::new("???", Utc::now(), "src", "Source");

        let extraction = registry.extract(SourceFormat::Unknown, &record);
        assert_eq!(extraction.system_id, GENERIC_SYSTEM_ID);
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut registry = FormatRegistry::new();
        let record = RawRecord::new("{\"x\": 1}", Utc::now(), "src", "Source");
        assert_eq!(registry.extract(SourceFormat::Json, &record).system_id, JSON_SYSTEM_ID);

        registry.register(SourceFormat::Json, Box::new(FixedNormalizer));

        let extraction = registry.extract(SourceFormat::Json, &record);
        assert_eq!(extraction.system_id, "ERP_FEED");
        assert_eq!(extraction.value, 42.0);
    }
}
