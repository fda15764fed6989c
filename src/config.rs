use crate::constants;
use crate::error::{PipelineError, Result};
use crate::normalize::UrlPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub documents_endpoint: String,
    pub base_url: String,
    pub registration_origin: String,
    /// Per-request timeout. Unset means requests wait indefinitely.
    pub timeout_seconds: Option<u64>,
    /// Address for the Prometheus exporter. Unset disables it.
    pub metrics_addr: Option<String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
    pub default_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents_endpoint: constants::DOCUMENTS_ENDPOINT.to_string(),
            base_url: constants::BASE_URL.to_string(),
            registration_origin: constants::REGISTRATION_ORIGIN.to_string(),
            timeout_seconds: None,
            metrics_addr: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_filter: constants::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file, then `.env`, then
    /// `RUNIT_*` environment variables.
    ///
    /// With no explicit path, a missing `config.toml` is fine. An explicit
    /// path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        dotenv::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Takes a closure so tests don't
    /// have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RUNIT_DOCUMENTS_ENDPOINT") {
            self.documents_endpoint = v;
        }
        if let Some(v) = lookup("RUNIT_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("RUNIT_REGISTRATION_ORIGIN") {
            self.registration_origin = v;
        }
        if let Some(v) = lookup("RUNIT_TIMEOUT_SECONDS") {
            let secs = v.trim().parse::<u64>().map_err(|e| {
                PipelineError::Config(format!("RUNIT_TIMEOUT_SECONDS '{}': {}", v, e))
            })?;
            self.timeout_seconds = Some(secs);
        }
        if let Some(v) = lookup("RUNIT_METRICS_ADDR") {
            self.metrics_addr = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = lookup("RUNIT_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(v)).filter(|p| !p.as_os_str().is_empty());
        }
        Ok(())
    }

    /// Check that endpoint and origins are absolute URLs and strip trailing slashes.
    pub fn validate(&mut self) -> Result<()> {
        for (name, value) in [
            ("documents_endpoint", &mut self.documents_endpoint),
            ("base_url", &mut self.base_url),
            ("registration_origin", &mut self.registration_origin),
        ] {
            let trimmed = value.trim().trim_end_matches('/').to_string();
            reqwest::Url::parse(&trimmed).map_err(|e| {
                PipelineError::Config(format!("{} '{}' is not an absolute URL: {}", name, value, e))
            })?;
            *value = trimmed;
        }
        Ok(())
    }

    pub fn url_policy(&self) -> UrlPolicy {
        UrlPolicy::new(&self.base_url, &self.registration_origin)
    }
}
