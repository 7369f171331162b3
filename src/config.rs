use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{BATCH_COMPLETED_EVENT, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use crate::error::{PipelineError, Result};

/// Top-level pipeline configuration, read from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    /// Event published once a batch has been persisted
    #[serde(default = "default_completion_event")]
    pub completion_event: String,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            completion_event: default_completion_event(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    /// Display name; defaults to the id
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: SourceKind,
}

impl SourceConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    Inline {
        records: Vec<String>,
    },
    Directory {
        path: PathBuf,
    },
    Http {
        url: String,
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    #[default]
    Memory,
    JsonLines {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrichConfig {
    /// Attributes attached to every record; empty means pass-through
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Directory for per-batch JSON reports; no reports when unset
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: default_log_dir() }
    }
}

fn default_pipeline_name() -> String {
    "batch".to_string()
}

fn default_completion_event() -> String {
    BATCH_COMPLETED_EVENT.to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl PipelineConfig {
    /// Resolve the config path: explicit argument, then `BIZDATA_CONFIG`, then `pipeline.toml`
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.completion_event.trim().is_empty() {
            return Err(PipelineError::Config("completion_event must not be empty".to_string()));
        }
        if self.sources.is_empty() {
            return Err(PipelineError::Config("at least one [[sources]] entry is required".to_string()));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(PipelineError::Config("source id must not be empty".to_string()));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(PipelineError::Config(format!("duplicate source id '{}'", source.id)));
            }
        }

        Ok(())
    }
}
