use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A page of the upstream listing could not be retrieved. Aborts the whole run.
    #[error("Failed to fetch page {page}: {cause}")]
    Fetch { page: u32, cause: String },

    #[error("Invalid registration link '{url}': {reason}")]
    InvalidLink { url: String, reason: String },
}

impl PipelineError {
    pub fn fetch(page: u32, cause: impl ToString) -> Self {
        PipelineError::Fetch {
            page,
            cause: cause.to_string(),
        }
    }

    /// True for failures of the upstream source, as opposed to local misconfiguration.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, PipelineError::Fetch { .. } | PipelineError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
