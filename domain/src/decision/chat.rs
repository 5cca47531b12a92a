//! Chat classification produced by the chat-decision collaborator.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What the operator's chat message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRequestType {
    /// Do something specific, possibly on another page
    TaskSpecific,
    /// Explore a new area; the target joins the regular queue
    Exploration,
    /// Answer only, no navigation
    Question,
}

impl ChatRequestType {
    pub fn as_str(&self) -> &str {
        match self {
            ChatRequestType::TaskSpecific => "task_specific",
            ChatRequestType::Exploration => "exploration",
            ChatRequestType::Question => "question",
        }
    }

    pub fn navigates(&self) -> bool {
        !matches!(self, ChatRequestType::Question)
    }
}

impl std::fmt::Display for ChatRequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChatRequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "task_specific" | "task" | "taskspecific" => Ok(ChatRequestType::TaskSpecific),
            "exploration" | "explore" => Ok(ChatRequestType::Exploration),
            "question" => Ok(ChatRequestType::Question),
            other => Err(format!("unknown chat request type: {}", other)),
        }
    }
}

/// Classification of one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDecision {
    pub request_type: ChatRequestType,
    pub target_url: Option<String>,
    pub needs_user_input: bool,
    /// Reply shown to the operator
    pub response: String,
}

impl ChatDecision {
    pub fn question(response: impl Into<String>) -> Self {
        Self {
            request_type: ChatRequestType::Question,
            target_url: None,
            needs_user_input: false,
            response: response.into(),
        }
    }

    pub fn navigate(
        request_type: ChatRequestType,
        target_url: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            request_type,
            target_url: Some(target_url.into()),
            needs_user_input: false,
            response: response.into(),
        }
    }

    /// Navigation target, if this decision navigates at all.
    pub fn navigation_target(&self) -> Option<&str> {
        if self.request_type.navigates() {
            self.target_url.as_deref()
        } else {
            None
        }
    }
}
