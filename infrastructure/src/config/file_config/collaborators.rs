//! Collaborator endpoints from TOML (`[collaborators]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URLs of the HTTP collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCollaboratorsConfig {
    /// Browser automation sidecar
    pub browser_url: String,
    pub decision_url: String,
    pub chat_url: String,
    pub enrichment_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for FileCollaboratorsConfig {
    fn default() -> Self {
        Self {
            browser_url: "http://127.0.0.1:4100".to_string(),
            decision_url: "http://127.0.0.1:4200".to_string(),
            chat_url: "http://127.0.0.1:4200".to_string(),
            enrichment_url: "http://127.0.0.1:4300".to_string(),
            request_timeout_seconds: 120,
        }
    }
}

impl FileCollaboratorsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// `(field, value)` pairs, for validation and diagnostics.
    pub fn endpoints(&self) -> [(&'static str, &str); 4] {
        [
            ("collaborators.browser_url", &self.browser_url),
            ("collaborators.decision_url", &self.decision_url),
            ("collaborators.chat_url", &self.chat_url),
            ("collaborators.enrichment_url", &self.enrichment_url),
        ]
    }
}
