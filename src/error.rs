use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Collection failed for source '{source_id}': {message}")]
    Collection { source_id: String, message: String },

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl PipelineError {
    pub fn collection(source_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        PipelineError::Collection {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
