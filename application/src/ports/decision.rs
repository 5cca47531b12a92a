//! Decision collaborator port
//!
//! Given the current screenshot and exploration context, the collaborator
//! returns the next [`ToolDecision`] for the page.

use async_trait::async_trait;
use scout_domain::{ActionHistoryEntry, DomainError, FlowContext, StepTool, ToolDecision};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid decision payload: {0}")]
    InvalidPayload(#[from] DomainError),

    #[error("Decision service unavailable: {0}")]
    Unavailable(String),
}

/// One earlier step on the same page, as shown to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub step_number: u32,
    pub tool: StepTool,
    pub instruction: String,
    pub reasoning: String,
    /// Step result including its machine-parseable markers
    pub result: String,
}

/// Everything the collaborator sees for one decision.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub screenshot: Vec<u8>,
    pub page_url: String,
    pub objective: String,
    pub additional_context: Option<String>,
    pub step_number: u32,
    pub conversation: Vec<ConversationTurn>,
    /// URLs waiting in the queue, in processing order
    pub queued_urls: Vec<String>,
    pub is_exploration: bool,
    pub max_pages_reached: bool,
    pub can_login: bool,
    pub user_inputs: HashMap<String, String>,
    pub flow_context: FlowContext,
    pub action_history: Vec<ActionHistoryEntry>,
    /// Instructions already run on this page and how many times
    pub repeated_actions: Vec<(String, usize)>,
}

/// Port for the decision collaborator.
///
/// `Ok(None)` means the collaborator had nothing to say; the engine treats
/// it like an error and ends the current page.
#[async_trait]
pub trait DecisionPort: Send + Sync {
    async fn decide(&self, context: &DecisionContext) -> Result<Option<ToolDecision>, DecisionError>;
}
