// Pipeline stages: validate, normalize, enrich, deduplicate

pub mod dedupe;
pub mod enrich;
pub mod normalize;
pub mod validate;

pub use dedupe::Deduplicator;
pub use enrich::{Enricher, IdentityEnricher, StaticAttributeEnricher};
pub use normalize::{detect_format, extract_value, Transformer};
pub use validate::{DefaultValidator, Validator};
