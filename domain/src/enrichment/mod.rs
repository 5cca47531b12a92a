//! Per-page enrichment artifacts (interaction graphs).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived artifact produced by the enrichment collaborator for one page.
///
/// Each refresh replaces the previous artifact; `revision` counts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentArtifact {
    pub url_hash: String,
    pub revision: u32,
    /// Last step included in the history the artifact was built from
    pub step_number: u32,
    /// Opaque payload (graph nodes/edges); rendered by the dashboard
    pub content: serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

impl EnrichmentArtifact {
    pub fn new(url_hash: impl Into<String>, step_number: u32, content: serde_json::Value) -> Self {
        Self {
            url_hash: url_hash.into(),
            revision: 1,
            step_number,
            content,
            generated_at: Utc::now(),
        }
    }

    /// Stamp this artifact as the successor of `previous`.
    pub fn succeeding(mut self, previous: Option<&EnrichmentArtifact>) -> Self {
        self.revision = previous.map_or(1, |p| p.revision + 1);
        self
    }
}
