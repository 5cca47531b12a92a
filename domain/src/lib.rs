//! Domain layer for scout
//!
//! This crate contains the core entities and value objects of a
//! queue-driven web exploration session. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Pages and the queue
//!
//! - **PageRecord**: a discovered page keyed by a stable URL hash
//! - **ExplorationSession**: the aggregate owning pages, the priority queue,
//!   counters, collected inputs, flow context and the action log
//!
//! ## Decisions
//!
//! - **ToolDecision**: a closed union of `act` / `request_input` / `standby`,
//!   validated when parsed from collaborator payloads
//! - **ChatDecision**: classification of an inbound chat message
//!
//! ## Pause / resume
//!
//! - **ExplorationCheckpoint**: snapshot taken when chat interrupts the loop

pub mod config;
pub mod core;
pub mod decision;
pub mod enrichment;
pub mod exploration;
pub mod page;
pub mod step;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{error::DomainError, string::truncate};
pub use decision::{
    chat::{ChatDecision, ChatRequestType},
    parser::{
        parse_chat_decision, parse_chat_decision_text, parse_tool_decision,
        parse_tool_decision_text,
    },
    tool_decision::{InputSpec, InputType, ToolAction, ToolDecision},
};
pub use enrichment::EnrichmentArtifact;
pub use exploration::{
    checkpoint::{ExplorationCheckpoint, ExplorationPhase},
    flow::{FlowContext, FlowTransition},
    history::{ActionHistoryEntry, page_repeat_counts, repeat_count},
    session::{EnqueueOutcome, ExplorationSession, SessionMetadata, UserInputEntry},
};
pub use page::{
    entities::{PageRecord, PageStatus, Screenshot, ScreenshotKind},
    identity::{normalize_url, parse_http_url, resolve_against, same_page, url_hash},
};
pub use step::{ExecutedStep, StepTool};
