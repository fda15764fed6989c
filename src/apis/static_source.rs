use crate::error::{PipelineError, Result};
use crate::types::{DocumentSource, DocumentsPage, RawDocument};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// In-memory document source for fixtures, offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pages: BTreeMap<u32, Vec<RawDocument>>,
    failing: BTreeSet<u32>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, documents: Vec<RawDocument>) -> Self {
        self.pages.insert(page, documents);
        self
    }

    /// Make `page` fail as if the upstream request had been rejected
    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing.insert(page);
        self
    }

    /// Load from a JSON fixture: either `{"1": {"documents": [...]}, ...}`
    /// or an array of page bodies numbered from 1.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut source = Self::new();
        match value {
            Value::Object(map) => {
                for (key, body) in map {
                    let page: u32 = key.trim().parse().map_err(|_| {
                        PipelineError::Config(format!("fixture page key '{}' is not a number", key))
                    })?;
                    let body: DocumentsPage = serde_json::from_value(body.clone())?;
                    source.pages.insert(page, body.documents);
                }
            }
            Value::Array(bodies) => {
                for (i, body) in bodies.iter().enumerate() {
                    let body: DocumentsPage = serde_json::from_value(body.clone())?;
                    source.pages.insert(i as u32 + 1, body.documents);
                }
            }
            _ => {
                return Err(PipelineError::Config(
                    "fixture must be an object keyed by page or an array of pages".to_string(),
                ))
            }
        }
        Ok(source)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        debug!("Loaded fixture {}", path.display());
        Self::from_json(&value)
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<RawDocument>> {
        if self.failing.contains(&page) {
            return Err(PipelineError::fetch(page, "simulated failure"));
        }
        // An unknown page is an empty listing, like the upstream past its last page
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}
