//! Chat decision collaborator port
//!
//! Classifies an operator chat message and produces the reply.

use async_trait::async_trait;
use scout_domain::{ChatDecision, DomainError, PageRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid chat payload: {0}")]
    InvalidPayload(#[from] DomainError),
}

/// Context handed to the chat collaborator.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub user_name: String,
    pub message: String,
    pub objective: String,
    pub current_url: Option<String>,
    /// Every page of the session with its full step history
    pub pages: Vec<PageRecord>,
}

#[async_trait]
pub trait ChatDecisionPort: Send + Sync {
    async fn classify(&self, context: &ChatContext) -> Result<ChatDecision, ChatError>;
}
