//! Exploration events emitted for the dashboard / console observer
//!
//! Every notable transition of a session produces one [`ExplorationEvent`].
//! Each carries the session's `user_name` and a timestamp for correlation;
//! page-scoped events also carry a [`PageScope`].
//!
//! Sinks are synchronous and must not block: the engine emits from inside
//! its step loop.

use chrono::{DateTime, Utc};
use scout_domain::{
    ChatRequestType, EnrichmentArtifact, ExecutedStep, InputSpec, StepTool, ToolDecision,
};
use serde::Serialize;
use tokio::sync::mpsc;

/// Page coordinates attached to page-scoped events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageScope {
    pub url: String,
    pub url_hash: String,
    pub step_number: u32,
}

impl PageScope {
    pub fn new(url: impl Into<String>, url_hash: impl Into<String>, step_number: u32) -> Self {
        Self {
            url: url.into(),
            url_hash: url_hash.into(),
            step_number,
        }
    }
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Event payloads, one per notable transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    PageStarted {
        #[serde(flatten)]
        page: PageScope,
        priority: u8,
    },
    PageCompleted {
        #[serde(flatten)]
        page: PageScope,
        steps_executed: usize,
        successful_steps: usize,
    },
    DecisionMade {
        #[serde(flatten)]
        page: PageScope,
        decision: ToolDecision,
    },
    ToolStarted {
        #[serde(flatten)]
        page: PageScope,
        tool: StepTool,
        instruction: String,
    },
    ToolCompleted {
        #[serde(flatten)]
        page: PageScope,
        step: ExecutedStep,
    },
    ActResult {
        #[serde(flatten)]
        page: PageScope,
        success: bool,
        url_changed: bool,
        new_url: Option<String>,
        queued: bool,
    },
    InputRequested {
        #[serde(flatten)]
        page: PageScope,
        inputs: Vec<InputSpec>,
        timeout_seconds: u64,
    },
    InputReceived {
        #[serde(flatten)]
        page: PageScope,
        keys: Vec<String>,
        skipped: bool,
    },
    StandbyCompleted {
        #[serde(flatten)]
        page: PageScope,
        waited_seconds: u64,
    },
    UrlDiscovered {
        url: String,
        url_hash: String,
        source_url: Option<String>,
        priority: u8,
    },
    SessionCompleted {
        objective_achieved: bool,
        total_pages_discovered: usize,
        total_actions_executed: usize,
        duration_seconds: i64,
    },
    EnrichmentStarted {
        url: String,
        url_hash: String,
    },
    EnrichmentUpdated {
        url: String,
        artifact: EnrichmentArtifact,
    },
    ChatMessage {
        role: ChatRole,
        text: String,
    },
    ChatNavigated {
        request_type: ChatRequestType,
        url: String,
        queued: bool,
    },
    ChatError {
        message: String,
    },
}

impl EventPayload {
    /// Wire name of the event (`page_started`, `act_result`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::PageStarted { .. } => "page_started",
            EventPayload::PageCompleted { .. } => "page_completed",
            EventPayload::DecisionMade { .. } => "decision_made",
            EventPayload::ToolStarted { .. } => "tool_started",
            EventPayload::ToolCompleted { .. } => "tool_completed",
            EventPayload::ActResult { .. } => "act_result",
            EventPayload::InputRequested { .. } => "input_requested",
            EventPayload::InputReceived { .. } => "input_received",
            EventPayload::StandbyCompleted { .. } => "standby_completed",
            EventPayload::UrlDiscovered { .. } => "url_discovered",
            EventPayload::SessionCompleted { .. } => "session_completed",
            EventPayload::EnrichmentStarted { .. } => "enrichment_started",
            EventPayload::EnrichmentUpdated { .. } => "enrichment_updated",
            EventPayload::ChatMessage { .. } => "chat_message",
            EventPayload::ChatNavigated { .. } => "chat_navigated",
            EventPayload::ChatError { .. } => "chat_error",
        }
    }

    pub fn page(&self) -> Option<&PageScope> {
        match self {
            EventPayload::PageStarted { page, .. }
            | EventPayload::PageCompleted { page, .. }
            | EventPayload::DecisionMade { page, .. }
            | EventPayload::ToolStarted { page, .. }
            | EventPayload::ToolCompleted { page, .. }
            | EventPayload::ActResult { page, .. }
            | EventPayload::InputRequested { page, .. }
            | EventPayload::InputReceived { page, .. }
            | EventPayload::StandbyCompleted { page, .. } => Some(page),
            _ => None,
        }
    }
}

/// An event with its correlation envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationEvent {
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl ExplorationEvent {
    pub fn new(user_name: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            user_name: user_name.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

/// Port for delivering exploration events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ExplorationEvent);
}

/// Forwards events into an unbounded channel.
///
/// A closed receiver is not an error: the observer may have gone away while
/// the session keeps running.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<ExplorationEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::UnboundedSender<ExplorationEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ExplorationEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_scoped_event_serializes_flat() {
        let event = ExplorationEvent::new(
            "alice",
            EventPayload::StandbyCompleted {
                page: PageScope::new("https://example.com", "example-com_root_abc", 4),
                waited_seconds: 3,
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "standby_completed");
        assert_eq!(value["user_name"], "alice");
        assert_eq!(value["url_hash"], "example-com_root_abc");
        assert_eq!(value["step_number"], 4);
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let event = ExplorationEvent::new(
            "alice",
            EventPayload::ChatError {
                message: "boom".to_string(),
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.kind());
        assert!(event.payload.page().is_none());
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelEventSink::new(tx);
        sink.emit(ExplorationEvent::new(
            "alice",
            EventPayload::ChatMessage {
                role: ChatRole::User,
                text: "hi".to_string(),
            },
        ));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), "chat_message");
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelEventSink::new(tx).emit(ExplorationEvent::new(
            "alice",
            EventPayload::ChatError {
                message: "x".to_string(),
            },
        ));
    }
}
