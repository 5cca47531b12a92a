//! Pause/resume checkpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of the queue-driven exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationPhase {
    #[default]
    Active,
    Paused,
    Completed,
}

impl ExplorationPhase {
    pub fn as_str(&self) -> &str {
        match self {
            ExplorationPhase::Active => "active",
            ExplorationPhase::Paused => "paused",
            ExplorationPhase::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExplorationPhase::Completed)
    }
}

impl std::fmt::Display for ExplorationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot taken when a chat message interrupts the exploration.
///
/// Kept in the session (and persisted) until resume logic decides the
/// exploration is completed, so repeated interruptions stay idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationCheckpoint {
    pub timestamp: DateTime<Utc>,
    pub current_page_url: Option<String>,
    pub current_page_hash: Option<String>,
    /// `page_queue` at snapshot time, in order
    pub remaining_queue: Vec<String>,
    /// Phase the exploration was in before the interruption
    pub exploration_phase: ExplorationPhase,
    pub last_step_number: u32,
}

impl ExplorationCheckpoint {
    /// Whether resuming should re-enter the queue engine.
    pub fn should_resume(&self) -> bool {
        !self.exploration_phase.is_completed()
    }
}
