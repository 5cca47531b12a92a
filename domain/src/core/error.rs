//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl DomainError {
    /// Whether the collaborator produced something we refused to run.
    pub fn is_rejected_decision(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidDecision(_) | DomainError::UnknownTool(_)
        )
    }
}
