//! Session persistence port
//!
//! The storage collaborator owns per-session metadata, per-page records,
//! screenshots, enrichment artifacts and the checkpoint blob. Everything a
//! restarted process needs to resume is reachable through this port.

use async_trait::async_trait;
use scout_domain::{
    EnrichmentArtifact, ExplorationCheckpoint, ExplorationSession, ScreenshotKind, SessionMetadata,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait SessionStorePort: Send + Sync {
    /// Cheap per-step persistence of the metadata only.
    async fn save_metadata(&self, user_name: &str, metadata: &SessionMetadata)
    -> Result<(), StoreError>;

    async fn save_session(&self, user_name: &str, session: &ExplorationSession)
    -> Result<(), StoreError>;

    async fn load_session(&self, user_name: &str) -> Result<Option<ExplorationSession>, StoreError>;

    async fn save_checkpoint(
        &self,
        user_name: &str,
        checkpoint: &ExplorationCheckpoint,
    ) -> Result<(), StoreError>;

    async fn load_checkpoint(
        &self,
        user_name: &str,
    ) -> Result<Option<ExplorationCheckpoint>, StoreError>;

    /// Persist a PNG and return its location.
    async fn save_screenshot(
        &self,
        user_name: &str,
        url_hash: &str,
        step_number: u32,
        kind: ScreenshotKind,
        png: &[u8],
    ) -> Result<String, StoreError>;

    async fn save_enrichment(
        &self,
        user_name: &str,
        artifact: &EnrichmentArtifact,
    ) -> Result<(), StoreError>;
}
