//! Page entities

use super::identity::{normalize_url, url_hash};
use crate::step::ExecutedStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a page within a session.
///
/// ```text
/// Queued ──> InProgress ──> Completed
/// ```
///
/// `InProgress` is also the state a page is left in when the loop is
/// suspended mid-page; such a page can be resumed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    #[default]
    Queued,
    InProgress,
    Completed,
}

impl PageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PageStatus::Queued => "queued",
            PageStatus::InProgress => "in_progress",
            PageStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PageStatus::Completed)
    }
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a screenshot was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotKind {
    /// Full-page capture taken when the page loop starts
    Initial,
    /// Capture taken before each decision
    Step,
    BeforeStandby,
    AfterStandby,
}

/// Reference to a persisted screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub step_number: u32,
    pub kind: ScreenshotKind,
    /// Location returned by the storage collaborator, if it persisted the image
    pub location: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl Screenshot {
    pub fn new(step_number: u32, kind: ScreenshotKind, location: Option<String>) -> Self {
        Self {
            step_number,
            kind,
            location,
            captured_at: Utc::now(),
        }
    }
}

/// A page discovered during exploration (Entity).
///
/// Created on first discovery, mutated by the page loop, never removed
/// from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub url_hash: String,
    pub status: PageStatus,
    /// Lower runs sooner
    pub priority: u8,
    /// URL of the page this one was discovered from
    pub source_url: Option<String>,
    pub executed_steps: Vec<ExecutedStep>,
    pub screenshots: Vec<Screenshot>,
    pub last_step_number: u32,
    pub discovered_at: DateTime<Utc>,
}

impl PageRecord {
    pub fn new(url: &str, priority: u8, source_url: Option<String>) -> Self {
        let url = normalize_url(url);
        Self {
            url_hash: url_hash(&url),
            url,
            status: PageStatus::Queued,
            priority,
            source_url,
            executed_steps: Vec::new(),
            screenshots: Vec::new(),
            last_step_number: 0,
            discovered_at: Utc::now(),
        }
    }

    /// Enter the page loop. A completed page that was queued again
    /// (e.g. after a sensitive flow ended on it) is reopened.
    pub fn mark_in_progress(&mut self) {
        self.status = PageStatus::InProgress;
    }

    pub fn mark_completed(&mut self) {
        self.status = PageStatus::Completed;
    }

    /// Record a finished step.
    pub fn record_step(&mut self, step: ExecutedStep) {
        self.last_step_number = step.step_number;
        self.executed_steps.push(step);
    }

    pub fn add_screenshot(&mut self, screenshot: Screenshot) {
        self.screenshots.push(screenshot);
    }

    pub fn successful_steps(&self) -> usize {
        self.executed_steps.iter().filter(|s| s.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepTool;

    #[test]
    fn test_new_page_is_normalized_and_queued() {
        let page = PageRecord::new("https://example.com/pricing/", 2, None);
        assert_eq!(page.url, "https://example.com/pricing");
        assert_eq!(page.url_hash, url_hash("https://example.com/pricing"));
        assert_eq!(page.status, PageStatus::Queued);
        assert_eq!(page.last_step_number, 0);
    }

    #[test]
    fn test_requeued_page_can_reopen() {
        let mut page = PageRecord::new("https://example.com", 1, None);
        page.mark_completed();
        assert!(page.status.is_terminal());
        page.mark_in_progress();
        assert_eq!(page.status, PageStatus::InProgress);
    }

    #[test]
    fn test_record_step_updates_last_step_number() {
        let mut page = PageRecord::new("https://example.com", 1, None);
        page.record_step(ExecutedStep::new(7, StepTool::Act, "Click", true, "ok"));
        page.record_step(ExecutedStep::new(9, StepTool::Act, "Click", false, "no"));
        assert_eq!(page.last_step_number, 9);
        assert_eq!(page.executed_steps.len(), 2);
        assert_eq!(page.successful_steps(), 1);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&PageStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
