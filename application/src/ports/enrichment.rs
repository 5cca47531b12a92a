//! Enrichment collaborator port
//!
//! Builds a derived per-page artifact (interaction graph) from the page's
//! accumulated history.

use async_trait::async_trait;
use scout_domain::{ActionHistoryEntry, EnrichmentArtifact, ExecutedStep, Screenshot};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Enrichment task failed: {0}")]
    TaskFailed(String),
}

/// Snapshot of one page's history sent to the collaborator.
#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    pub user_name: String,
    pub url: String,
    pub url_hash: String,
    pub screenshots: Vec<Screenshot>,
    pub steps: Vec<ExecutedStep>,
    /// Actions whose source is this page
    pub actions: Vec<ActionHistoryEntry>,
    pub previous: Option<EnrichmentArtifact>,
}

#[async_trait]
pub trait EnrichmentPort: Send + Sync {
    async fn enrich(&self, request: EnrichmentRequest) -> Result<EnrichmentArtifact, EnrichmentError>;
}
