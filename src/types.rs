use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Raw event document as returned by the aggregator API. Untrusted: any
/// field may be missing or carry an unexpected type.
pub type RawDocument = serde_json::Value;

/// Body of `GET {endpoint}?page=N`. The `documents` array is required: a body
/// without one is an upstream failure, not an empty page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentsPage {
    pub documents: Vec<RawDocument>,
}

/// Core trait for anything that can serve pages of raw documents
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    /// Identifier used in logs and metrics
    fn source_name(&self) -> &'static str;

    /// Fetch every document on one page. Any failure is reported as
    /// `PipelineError::Fetch` for that page.
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawDocument>>;
}
