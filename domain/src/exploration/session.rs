//! Exploration session aggregate.
//!
//! Owns every page record, the priority-sorted queue, counters, collected
//! user inputs, the sensitive-flow context, the action log and the latest
//! checkpoint. The sequential page loop is its only writer.

use super::checkpoint::{ExplorationCheckpoint, ExplorationPhase};
use super::flow::FlowContext;
use super::history::ActionHistoryEntry;
use crate::decision::tool_decision::InputType;
use crate::page::entities::{PageRecord, PageStatus};
use crate::page::identity::url_hash;
use crate::step::ExecutedStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value the user supplied through `request_input`.
///
/// Stored unmasked: later `act` instructions must be able to type it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputEntry {
    pub value: String,
    pub input_type: InputType,
    pub timestamp: DateTime<Utc>,
}

/// Session-level metadata, persisted after every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub user_name: String,
    pub objective: String,
    pub start_url: String,
    #[serde(default)]
    pub additional_context: Option<String>,
    #[serde(default)]
    pub can_login: bool,
    /// Pure exploration: reaching the objective does not stop the session
    pub is_exploration: bool,
    pub max_pages: usize,
    pub total_pages_discovered: usize,
    pub total_actions_executed: usize,
    pub objective_achieved: bool,
    pub phase: ExplorationPhase,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionMetadata {
    pub fn new(
        user_name: impl Into<String>,
        objective: impl Into<String>,
        start_url: impl Into<String>,
        is_exploration: bool,
        max_pages: usize,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            objective: objective.into(),
            start_url: start_url.into(),
            additional_context: None,
            can_login: false,
            is_exploration,
            max_pages,
            total_pages_discovered: 0,
            total_actions_executed: 0,
            objective_achieved: false,
            phase: ExplorationPhase::Active,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn with_login_context(mut self, additional_context: Option<String>, can_login: bool) -> Self {
        self.additional_context = additional_context;
        self.can_login = can_login;
        self
    }

    /// Duration from start to completion (or to now, while running).
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

/// Result of an enqueue attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new page record was created and queued
    Enqueued { url: String, url_hash: String },
    /// A known page was put back into the queue (forced enqueue only)
    Requeued { url: String, url_hash: String },
    AlreadyKnown,
    MaxPagesReached,
}

impl EnqueueOutcome {
    pub fn is_enqueued(&self) -> bool {
        matches!(
            self,
            EnqueueOutcome::Enqueued { .. } | EnqueueOutcome::Requeued { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationSession {
    pub pages: HashMap<String, PageRecord>,
    /// Page keys, sorted ascending by priority (stable)
    pub page_queue: Vec<String>,
    pub global_step_counter: u32,
    pub user_inputs: HashMap<String, UserInputEntry>,
    pub flow_context: FlowContext,
    pub action_history: Vec<ActionHistoryEntry>,
    pub metadata: SessionMetadata,
    pub checkpoint: Option<ExplorationCheckpoint>,
    /// Key of the page popped from the queue and not yet finished
    #[serde(default)]
    pub current_page: Option<String>,
}

impl ExplorationSession {
    pub fn new(metadata: SessionMetadata) -> Self {
        Self {
            pages: HashMap::new(),
            page_queue: Vec::new(),
            global_step_counter: 0,
            user_inputs: HashMap::new(),
            flow_context: FlowContext::default(),
            action_history: Vec::new(),
            metadata,
            checkpoint: None,
            current_page: None,
        }
    }

    // ==================== Queue ====================

    pub fn max_pages_reached(&self) -> bool {
        self.metadata.total_pages_discovered >= self.metadata.max_pages
    }

    /// Queue a newly discovered page.
    ///
    /// No-op when the page is already known or the page cap is reached.
    pub fn enqueue(&mut self, url: &str, priority: u8, source_url: Option<&str>) -> EnqueueOutcome {
        let key = url_hash(url);
        if self.pages.contains_key(&key) {
            return EnqueueOutcome::AlreadyKnown;
        }
        if self.max_pages_reached() {
            return EnqueueOutcome::MaxPagesReached;
        }
        self.insert_new(url, priority, source_url)
    }

    /// Queue a page regardless of whether it is known or the cap is reached.
    ///
    /// Used when a sensitive flow ends: the post-flow page must be processed
    /// even if it was seen before the flow. A page already in the queue is
    /// only re-prioritized, so it appears there exactly once.
    pub fn force_enqueue(
        &mut self,
        url: &str,
        priority: u8,
        source_url: Option<&str>,
    ) -> EnqueueOutcome {
        let key = url_hash(url);
        let Some(page) = self.pages.get_mut(&key) else {
            return self.insert_new(url, priority, source_url);
        };

        page.priority = priority;
        page.status = PageStatus::Queued;
        let url = page.url.clone();
        if !self.page_queue.contains(&key) {
            self.page_queue.push(key.clone());
        }
        self.sort_queue();
        EnqueueOutcome::Requeued { url, url_hash: key }
    }

    fn insert_new(&mut self, url: &str, priority: u8, source_url: Option<&str>) -> EnqueueOutcome {
        let (url, key) = self.insert_record(url, priority, source_url);
        self.page_queue.push(key.clone());
        self.sort_queue();
        EnqueueOutcome::Enqueued { url, url_hash: key }
    }

    fn insert_record(&mut self, url: &str, priority: u8, source_url: Option<&str>) -> (String, String) {
        let page = PageRecord::new(url, priority, source_url.map(str::to_string));
        let ids = (page.url.clone(), page.url_hash.clone());
        self.pages.insert(page.url_hash.clone(), page);
        self.metadata.total_pages_discovered += 1;
        ids
    }

    /// Record a page the operator visited outside the loop.
    ///
    /// The page becomes known (and counts as discovered) but is not queued,
    /// so the page loop never processes it. Returns `true` when a new
    /// record was created.
    pub fn register(&mut self, url: &str, priority: u8, source_url: Option<&str>) -> bool {
        if self.pages.contains_key(&url_hash(url)) || self.max_pages_reached() {
            return false;
        }
        self.insert_record(url, priority, source_url);
        true
    }

    /// Stable sort by priority; equal priorities keep discovery order.
    fn sort_queue(&mut self) {
        let pages = &self.pages;
        self.page_queue
            .sort_by_key(|k| pages.get(k).map(|p| p.priority).unwrap_or(u8::MAX));
    }

    /// Take the head of the queue and make it the current page.
    pub fn pop_next(&mut self) -> Option<String> {
        if self.page_queue.is_empty() {
            return None;
        }
        let key = self.page_queue.remove(0);
        self.current_page = Some(key.clone());
        Some(key)
    }

    /// URLs currently waiting in the queue, in processing order.
    pub fn queued_urls(&self) -> Vec<String> {
        self.page_queue
            .iter()
            .filter_map(|k| self.pages.get(k).map(|p| p.url.clone()))
            .collect()
    }

    pub fn page(&self, url_hash: &str) -> Option<&PageRecord> {
        self.pages.get(url_hash)
    }

    pub fn page_mut(&mut self, url_hash: &str) -> Option<&mut PageRecord> {
        self.pages.get_mut(url_hash)
    }

    /// Mark a page completed, unless it was queued again while it ran
    /// (a sensitive flow that ended on the page itself).
    pub fn complete_page(&mut self, url_hash: &str) -> Option<&PageRecord> {
        if self.current_page.as_deref() == Some(url_hash) {
            self.current_page = None;
        }
        let requeued = self.page_queue.iter().any(|k| k == url_hash);
        let page = self.pages.get_mut(url_hash)?;
        if !requeued {
            page.mark_completed();
        }
        Some(page)
    }

    // ==================== Steps ====================

    /// Advance the global step counter and return the new step number.
    pub fn next_step(&mut self) -> u32 {
        self.global_step_counter += 1;
        self.global_step_counter
    }

    /// Append a step to its page and count it as an executed action.
    pub fn record_step(&mut self, url_hash: &str, step: ExecutedStep) {
        if let Some(page) = self.pages.get_mut(url_hash) {
            page.record_step(step);
        }
        self.metadata.total_actions_executed += 1;
    }

    pub fn record_action(&mut self, entry: ActionHistoryEntry) {
        self.action_history.push(entry);
    }

    pub fn store_input(&mut self, key: impl Into<String>, value: impl Into<String>, input_type: InputType) {
        self.user_inputs.insert(
            key.into(),
            UserInputEntry {
                value: value.into(),
                input_type,
                timestamp: Utc::now(),
            },
        );
    }

    /// Plain key → value view of the stored inputs.
    pub fn input_values(&self) -> HashMap<String, String> {
        self.user_inputs
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    // ==================== Checkpoint ====================

    /// Snapshot the queue and the current page for a pause.
    pub fn snapshot_checkpoint(&self) -> ExplorationCheckpoint {
        let current_page_url = self
            .current_page
            .as_ref()
            .and_then(|k| self.pages.get(k))
            .map(|p| p.url.clone());
        ExplorationCheckpoint {
            timestamp: Utc::now(),
            current_page_url,
            current_page_hash: self.current_page.clone(),
            remaining_queue: self.page_queue.clone(),
            exploration_phase: self.metadata.phase,
            last_step_number: self.global_step_counter,
        }
    }

    /// Rebuild the queue from a checkpoint.
    ///
    /// The checkpoint's order is restored exactly; pages queued after the
    /// snapshot (e.g. by a chat navigation) are kept and merged in by
    /// priority. Unknown keys and pages completed since the snapshot are
    /// dropped.
    pub fn restore_queue(&mut self, checkpoint: &ExplorationCheckpoint) {
        let mut restored: Vec<String> = checkpoint
            .remaining_queue
            .iter()
            .filter(|k| {
                self.pages
                    .get(*k)
                    .is_some_and(|p| p.status != PageStatus::Completed)
            })
            .cloned()
            .collect();
        for key in &self.page_queue {
            if !restored.contains(key) {
                restored.push(key.clone());
            }
        }
        self.page_queue = restored;
        self.sort_queue();
    }

    /// Put the page the interruption caught back at the head of the queue.
    /// The page may be `in_progress` or popped but not yet started. Returns
    /// whether anything was requeued.
    pub fn requeue_interrupted(&mut self, checkpoint: &ExplorationCheckpoint) -> bool {
        let Some(key) = checkpoint.current_page_hash.as_deref() else {
            return false;
        };
        let interrupted = self
            .pages
            .get(key)
            .is_some_and(|p| p.status != PageStatus::Completed);
        if !interrupted || self.page_queue.iter().any(|k| k == key) {
            return false;
        }
        self.page_queue.insert(0, key.to_string());
        true
    }

    /// Mark the whole exploration finished.
    pub fn complete(&mut self, objective_achieved: bool) {
        self.metadata.objective_achieved |= objective_achieved;
        self.metadata.phase = ExplorationPhase::Completed;
        self.metadata.completed_at = Some(Utc::now());
        self.current_page = None;
        if let Some(cp) = self.checkpoint.as_mut() {
            cp.exploration_phase = ExplorationPhase::Completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepTool;

    fn session(max_pages: usize) -> ExplorationSession {
        ExplorationSession::new(SessionMetadata::new(
            "alice",
            "find pricing",
            "https://example.com",
            false,
            max_pages,
        ))
    }

    #[test]
    fn test_enqueue_is_idempotent_for_equivalent_urls() {
        let mut s = session(10);
        assert!(s.enqueue("https://example.com/pricing/", 2, None).is_enqueued());
        assert_eq!(
            s.enqueue("https://EXAMPLE.com/pricing", 2, None),
            EnqueueOutcome::AlreadyKnown
        );
        assert_eq!(s.pages.len(), 1);
        assert_eq!(s.page_queue.len(), 1);
        assert_eq!(s.metadata.total_pages_discovered, 1);
    }

    #[test]
    fn test_priority_ordering_is_stable() {
        let mut s = session(10);
        s.enqueue("https://example.com/a", 2, None);
        s.enqueue("https://example.com/b", 1, None);
        s.enqueue("https://example.com/c", 2, None);
        s.enqueue("https://example.com/d", 1, None);

        let keys: Vec<String> = std::iter::from_fn(|| s.pop_next()).collect();
        let order: Vec<String> = keys.iter().map(|k| s.pages[k].url.clone()).collect();
        assert_eq!(
            order,
            vec![
                "https://example.com/b",
                "https://example.com/d",
                "https://example.com/a",
                "https://example.com/c",
            ]
        );
    }

    #[test]
    fn test_max_pages_cap() {
        let mut s = session(2);
        assert!(s.enqueue("https://example.com/1", 2, None).is_enqueued());
        assert!(s.enqueue("https://example.com/2", 2, None).is_enqueued());
        assert!(s.max_pages_reached());

        let queue_before = s.page_queue.clone();
        for i in 3..6 {
            let outcome = s.enqueue(&format!("https://example.com/{}", i), 0, None);
            assert_eq!(outcome, EnqueueOutcome::MaxPagesReached);
        }
        assert_eq!(s.page_queue, queue_before);
        assert_eq!(s.metadata.total_pages_discovered, 2);
    }

    #[test]
    fn test_force_enqueue_known_page_appears_once_at_top() {
        let mut s = session(10);
        s.enqueue("https://example.com/a", 1, None);
        s.enqueue("https://example.com/home", 2, None);

        let outcome = s.force_enqueue("https://example.com/home/", 0, None);
        assert!(matches!(outcome, EnqueueOutcome::Requeued { .. }));
        let home = url_hash("https://example.com/home");
        assert_eq!(s.page_queue.first(), Some(&home));
        assert_eq!(s.page_queue.iter().filter(|k| **k == home).count(), 1);
        assert_eq!(s.metadata.total_pages_discovered, 2);
    }

    #[test]
    fn test_force_enqueue_completed_page_reopens_it() {
        let mut s = session(1);
        s.enqueue("https://example.com/login", 1, None);
        let key = s.pop_next().unwrap();
        s.page_mut(&key).unwrap().mark_completed();

        assert!(s.force_enqueue("https://example.com/login", 0, None).is_enqueued());
        assert_eq!(s.page(&key).unwrap().status, PageStatus::Queued);
        assert_eq!(s.page_queue, vec![key]);
    }

    #[test]
    fn test_complete_page_keeps_requeued_page_queued() {
        let mut s = session(10);
        s.enqueue("https://example.com/login", 1, None);
        let key = s.pop_next().unwrap();
        s.page_mut(&key).unwrap().mark_in_progress();
        s.force_enqueue("https://example.com/login", 0, None);

        assert_eq!(s.complete_page(&key).unwrap().status, PageStatus::Queued);
        s.pop_next();
        assert_eq!(s.complete_page(&key).unwrap().status, PageStatus::Completed);
    }

    #[test]
    fn test_record_step_counts_actions() {
        let mut s = session(10);
        s.enqueue("https://example.com", 1, None);
        let key = url_hash("https://example.com");
        let n = s.next_step();
        s.record_step(&key, ExecutedStep::new(n, StepTool::Act, "Click", true, "ok"));
        assert_eq!(s.metadata.total_actions_executed, 1);
        assert_eq!(s.page(&key).unwrap().last_step_number, 1);
    }

    #[test]
    fn test_checkpoint_round_trip_restores_exact_queue() {
        let mut s = session(10);
        for (path, p) in [("a", 2), ("b", 1), ("c", 2), ("d", 1)] {
            s.enqueue(&format!("https://example.com/{}", path), p, None);
        }
        let before = s.page_queue.clone();
        let cp = s.snapshot_checkpoint();

        let json = serde_json::to_string(&cp).unwrap();
        let cp: ExplorationCheckpoint = serde_json::from_str(&json).unwrap();

        s.page_queue.clear();
        s.restore_queue(&cp);
        assert_eq!(s.page_queue, before);
    }

    #[test]
    fn test_restore_keeps_pages_queued_after_snapshot() {
        let mut s = session(10);
        s.enqueue("https://example.com/a", 2, None);
        let cp = s.snapshot_checkpoint();
        s.enqueue("https://example.com/chat-target", 0, None);

        s.restore_queue(&cp);
        assert_eq!(
            s.queued_urls(),
            vec!["https://example.com/chat-target", "https://example.com/a"]
        );
    }

    #[test]
    fn test_restore_skips_pages_completed_after_snapshot() {
        let mut s = session(10);
        s.enqueue("https://example.com/a", 2, None);
        s.enqueue("https://example.com/b", 2, None);
        let cp = s.snapshot_checkpoint();

        let a = s.pop_next().unwrap();
        s.page_mut(&a).unwrap().mark_completed();
        s.restore_queue(&cp);
        assert_eq!(s.queued_urls(), vec!["https://example.com/b"]);
    }

    #[test]
    fn test_requeue_interrupted_page() {
        let mut s = session(10);
        s.enqueue("https://example.com/", 1, None);
        s.enqueue("https://example.com/b", 2, None);
        let current = s.pop_next().unwrap();
        s.page_mut(&current).unwrap().mark_in_progress();

        let cp = s.snapshot_checkpoint();
        assert_eq!(cp.current_page_url.as_deref(), Some("https://example.com/"));
        s.restore_queue(&cp);
        assert!(s.requeue_interrupted(&cp));
        assert!(!s.requeue_interrupted(&cp));
        assert_eq!(s.page_queue.first(), Some(&current));
    }

    #[test]
    fn test_snapshot_right_after_pop_keeps_popped_page() {
        let mut s = session(10);
        s.enqueue("https://example.com/", 1, None);
        s.enqueue("https://example.com/b", 2, None);
        let popped = s.pop_next().unwrap();

        // Snapshot before the page loop marks the page in_progress
        let cp = s.snapshot_checkpoint();
        assert_eq!(cp.current_page_hash.as_deref(), Some(popped.as_str()));
        assert_eq!(cp.remaining_queue, vec![url_hash("https://example.com/b")]);

        s.page_mut(&popped).unwrap().mark_in_progress();
        s.restore_queue(&cp);
        assert!(s.requeue_interrupted(&cp));
        assert_eq!(
            s.queued_urls(),
            vec!["https://example.com/", "https://example.com/b"]
        );
    }

    #[test]
    fn test_complete_page_clears_current_page() {
        let mut s = session(10);
        s.enqueue("https://example.com/a", 1, None);
        let key = s.pop_next().unwrap();
        assert_eq!(s.current_page.as_deref(), Some(key.as_str()));

        s.complete_page(&key);
        assert!(s.current_page.is_none());
        assert!(s.snapshot_checkpoint().current_page_hash.is_none());
    }

    #[test]
    fn test_register_records_page_without_queueing() {
        let mut s = session(2);
        s.enqueue("https://example.com/a", 1, None);

        assert!(s.register("https://example.com/account", 2, Some("https://example.com/a")));
        assert!(!s.register("https://example.com/account/", 2, None));
        let key = url_hash("https://example.com/account");
        assert_eq!(s.page(&key).unwrap().status, PageStatus::Queued);
        assert!(!s.page_queue.contains(&key));
        assert_eq!(s.metadata.total_pages_discovered, 2);

        assert!(!s.register("https://example.com/other", 2, None));
        assert!(s.page(&url_hash("https://example.com/other")).is_none());
    }

    #[test]
    fn test_complete_marks_checkpoint_completed() {
        let mut s = session(10);
        s.checkpoint = Some(s.snapshot_checkpoint());
        s.complete(false);
        assert_eq!(s.metadata.phase, ExplorationPhase::Completed);
        assert!(s.metadata.completed_at.is_some());
        assert!(!s.checkpoint.as_ref().unwrap().should_resume());
    }

    #[test]
    fn test_store_input_is_unmasked() {
        let mut s = session(10);
        s.store_input("login_password", "hunter2", InputType::Password);
        assert_eq!(s.input_values()["login_password"], "hunter2");
    }
}
