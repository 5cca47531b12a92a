//! Browser automation port
//!
//! Defines the interface to the browsing collaborator that drives the real
//! page (DOM interaction, navigation, screenshots).

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while driving the browser
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Action failed: {0}")]
    Action(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// What the collaborator reports after a free-text action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActOutcome {
    pub success: bool,
    pub message: String,
}

impl ActOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Port for the browser automation collaborator.
///
/// A single browsing session with one active page; calls are never issued
/// concurrently by the engine.
#[async_trait]
pub trait BrowserPort: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Perform a natural-language instruction on the current page.
    async fn act(&self, instruction: &str) -> Result<ActOutcome, BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// PNG bytes of the viewport (or the whole page when `full_page`).
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, BrowserError>;
}
