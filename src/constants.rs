/// Event published by the orchestrator once a batch has been persisted
pub const BATCH_COMPLETED_EVENT: &str = "batch-completed";

// System identifiers stamped on normalized records, one per detected format
pub const JSON_SYSTEM_ID: &str = "JSON_API";
pub const CSV_SYSTEM_ID: &str = "CSV_FILE";
pub const XML_SYSTEM_ID: &str = "XML_LEGACY";
pub const GENERIC_SYSTEM_ID: &str = "GENERIC_TEXT";

// Coarse categories matching the system identifiers above
pub const JSON_CATEGORY: &str = "api";
pub const CSV_CATEGORY: &str = "file";
pub const XML_CATEGORY: &str = "legacy";
pub const GENERIC_CATEGORY: &str = "unstructured";

/// Value used when no numeric token can be extracted from a record
pub const DEFAULT_VALUE: f64 = 1.0;

/// Default config file looked up when neither --config nor BIZDATA_CONFIG is given
pub const DEFAULT_CONFIG_PATH: &str = "pipeline.toml";

/// Environment variable overriding the config file path
pub const CONFIG_PATH_ENV: &str = "BIZDATA_CONFIG";
