//! Types for the exploration use case.

use crate::ports::browser::BrowserError;
use crate::ports::chat_decision::ChatError;
use crate::ports::session_store::StoreError;
use crate::use_cases::shared::Suspension;
use scout_domain::{DomainError, ExecutedStep};
use thiserror::Error;

/// Errors that can occur during exploration.
///
/// Inside the page loop every variant is a page-level failure: the page is
/// force-completed and the queue moves on.
#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Chat decision failed: {0}")]
    Chat(#[from] ChatError),

    #[error("Invalid input: {0}")]
    Invalid(#[from] DomainError),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("No active session for user: {0}")]
    NoSession(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ExploreError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExploreError::Cancelled)
    }
}

/// How a call to the queue engine's `run` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The session was finalized (queue exhausted, objective met, or stopped)
    Finished { objective_achieved: bool },
    /// A chat interruption paused the loop; the session is resumable
    Paused,
}

impl RunOutcome {
    pub fn objective_achieved(&self) -> bool {
        matches!(
            self,
            RunOutcome::Finished {
                objective_achieved: true
            }
        )
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, RunOutcome::Paused)
    }
}

/// How the page loop left a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageOutcome {
    Completed,
    /// Left `in_progress` at a suspension point
    Suspended(Suspension),
}

/// Result of dispatching one tool.
#[derive(Debug, Clone)]
pub(crate) enum Dispatch {
    Step(ExecutedStep),
    /// The gate tripped mid-dispatch; nothing is recorded
    Suspended(Suspension),
}
