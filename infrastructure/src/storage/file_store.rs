//! File-backed session store.
//!
//! ```text
//! <base>/<user>/
//!   metadata.json
//!   session.json
//!   checkpoint.json
//!   pages/<url_hash>/
//!     enrichment.json
//!     screenshots/step_<n>_<kind>.png
//! ```
//!
//! JSON documents are written to a temporary file first and renamed into
//! place, so a crash never leaves a half-written session behind.

use async_trait::async_trait;
use scout_application::{SessionStorePort, StoreError};
use scout_domain::{
    EnrichmentArtifact, ExplorationCheckpoint, ExplorationSession, ScreenshotKind, SessionMetadata,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding one user's session.
    pub fn session_dir(&self, user_name: &str) -> PathBuf {
        self.base_dir.join(path_component(user_name))
    }

    fn page_dir(&self, user_name: &str, url_hash: &str) -> PathBuf {
        self.session_dir(user_name)
            .join("pages")
            .join(path_component(url_hash))
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(path, &json).await
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl SessionStorePort for FileSessionStore {
    async fn save_metadata(
        &self,
        user_name: &str,
        metadata: &SessionMetadata,
    ) -> Result<(), StoreError> {
        let path = self.session_dir(user_name).join("metadata.json");
        self.write_json(&path, metadata).await
    }

    async fn save_session(
        &self,
        user_name: &str,
        session: &ExplorationSession,
    ) -> Result<(), StoreError> {
        let dir = self.session_dir(user_name);
        self.write_json(&dir.join("session.json"), session).await?;
        self.write_json(&dir.join("metadata.json"), &session.metadata)
            .await
    }

    async fn load_session(&self, user_name: &str) -> Result<Option<ExplorationSession>, StoreError> {
        let path = self.session_dir(user_name).join("session.json");
        self.read_json(&path).await
    }

    async fn save_checkpoint(
        &self,
        user_name: &str,
        checkpoint: &ExplorationCheckpoint,
    ) -> Result<(), StoreError> {
        let path = self.session_dir(user_name).join("checkpoint.json");
        self.write_json(&path, checkpoint).await
    }

    async fn load_checkpoint(
        &self,
        user_name: &str,
    ) -> Result<Option<ExplorationCheckpoint>, StoreError> {
        let path = self.session_dir(user_name).join("checkpoint.json");
        self.read_json(&path).await
    }

    async fn save_screenshot(
        &self,
        user_name: &str,
        url_hash: &str,
        step_number: u32,
        kind: ScreenshotKind,
        png: &[u8],
    ) -> Result<String, StoreError> {
        let path = self
            .page_dir(user_name, url_hash)
            .join("screenshots")
            .join(format!("step_{}_{}.png", step_number, kind_slug(kind)));
        write_atomic(&path, png).await?;
        debug!("Saved screenshot {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn save_enrichment(
        &self,
        user_name: &str,
        artifact: &EnrichmentArtifact,
    ) -> Result<(), StoreError> {
        let path = self
            .page_dir(user_name, &artifact.url_hash)
            .join("enrichment.json");
        self.write_json(&path, artifact).await
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await.map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).await.map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

fn kind_slug(kind: ScreenshotKind) -> &'static str {
    match kind {
        ScreenshotKind::Initial => "initial",
        ScreenshotKind::Step => "step",
        ScreenshotKind::BeforeStandby => "before_standby",
        ScreenshotKind::AfterStandby => "after_standby",
    }
}

/// User names come from the operator; keep them to one safe path segment.
fn path_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        _ => cleaned,
    }
}
