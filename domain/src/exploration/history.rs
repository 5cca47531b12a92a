//! Append-only log of executed `act` instructions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHistoryEntry {
    pub instruction: String,
    pub source_url: String,
    pub target_url: Option<String>,
    pub url_changed: bool,
    pub step_number: u32,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

impl ActionHistoryEntry {
    pub fn new(
        instruction: impl Into<String>,
        source_url: impl Into<String>,
        target_url: Option<String>,
        step_number: u32,
        success: bool,
    ) -> Self {
        let source_url = source_url.into();
        let url_changed = target_url
            .as_deref()
            .is_some_and(|t| !crate::page::identity::same_page(t, &source_url));
        Self {
            instruction: instruction.into(),
            source_url,
            target_url,
            url_changed,
            step_number,
            timestamp: Utc::now(),
            success,
        }
    }
}

/// How many times `instruction` already ran on `source_url`.
///
/// Instructions are compared case-insensitively with collapsed whitespace.
pub fn repeat_count(history: &[ActionHistoryEntry], source_url: &str, instruction: &str) -> usize {
    let wanted = canonical_instruction(instruction);
    history
        .iter()
        .filter(|e| {
            crate::page::identity::same_page(&e.source_url, source_url)
                && canonical_instruction(&e.instruction) == wanted
        })
        .count()
}

/// Every instruction already run on `source_url`, in first-run order, with
/// its [`repeat_count`]. Spellings that compare equal are listed once.
pub fn page_repeat_counts(history: &[ActionHistoryEntry], source_url: &str) -> Vec<(String, usize)> {
    let mut seen: Vec<String> = Vec::new();
    let mut counts = Vec::new();
    for entry in history
        .iter()
        .filter(|e| crate::page::identity::same_page(&e.source_url, source_url))
    {
        let canonical = canonical_instruction(&entry.instruction);
        if seen.contains(&canonical) {
            continue;
        }
        seen.push(canonical);
        counts.push((
            entry.instruction.clone(),
            repeat_count(history, source_url, &entry.instruction),
        ));
    }
    counts
}

fn canonical_instruction(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
