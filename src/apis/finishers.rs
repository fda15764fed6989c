use crate::config::Config;
use crate::constants::FINISHERS_SOURCE;
use crate::error::{PipelineError, Result};
use crate::types::{DocumentSource, DocumentsPage, RawDocument};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Reads the aggregator's paginated `documents` endpoint
pub struct FinishersSource {
    client: reqwest::Client,
    endpoint: String,
}

impl FinishersSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: config.documents_endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}?page={}", self.endpoint, page)
    }
}

/// Decode a page body. A body that is not a JSON object carrying a
/// `documents` array is a fetch failure.
pub fn decode_page(page: u32, bytes: &[u8]) -> Result<Vec<RawDocument>> {
    let body: DocumentsPage = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::fetch(page, format!("undecodable body: {e}")))?;
    Ok(body.documents)
}

#[async_trait::async_trait]
impl DocumentSource for FinishersSource {
    fn source_name(&self) -> &'static str {
        FINISHERS_SOURCE
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawDocument>> {
        let url = self.page_url(page);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::fetch(page, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::fetch(page, format!("HTTP {}", status.as_u16())));
        }
        let bytes = resp.bytes().await.map_err(|e| PipelineError::fetch(page, e))?;

        let documents = decode_page(page, &bytes)?;
        info!("Fetched {} documents from page {}", documents.len(), page);
        Ok(documents)
    }
}
