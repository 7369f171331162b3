use chrono::{DateTime, Utc};

use crate::domain::RawRecord;

/// Gate deciding whether a raw record may enter the pipeline
pub trait Validator: Send + Sync {
    fn validate(&self, record: &RawRecord) -> bool;
}

/// Minimal gate: non-blank content and a real capture timestamp.
///
/// Rejection is silent. Schema or business-rule checks are not performed here;
/// richer gates plug in through [`Validator`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValidator;

impl DefaultValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for DefaultValidator {
    fn validate(&self, record: &RawRecord) -> bool {
        !record.content.trim().is_empty() && record.captured_at != DateTime::<Utc>::UNIX_EPOCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, captured_at: DateTime<Utc>) -> RawRecord {
        RawRecord::new(content, captured_at, "crm", "CRM export")
    }

    #[test]
    fn test_accepts_content_with_timestamp() {
        let validator = DefaultValidator::new();
        assert!(validator.validate(&record("{\"total\": 12}", Utc::now())));
        assert!(validator.validate(&record("  plain text  ", Utc::now())));
    }

    #[test]
    fn test_rejects_blank_content() {
        let validator = DefaultValidator::new();
        for blank in ["", "   ", "\n\t  \r\n"] {
            assert!(!validator.validate(&record(blank, Utc::now())), "accepted {:?}", blank);
        }
    }

    #[test]
    fn test_rejects_zero_timestamp() {
        let validator = DefaultValidator::new();
        assert!(!validator.validate(&record("a,b\n1,2", DateTime::<Utc>::UNIX_EPOCH)));
        assert!(!validator.validate(&record("a,b\n1,2", DateTime::<Utc>::default())));
    }
}
