//! Application layer for scout
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutionParams, ExplorationConfig};
pub use ports::{
    browser::{ActOutcome, BrowserError, BrowserPort},
    chat_decision::{ChatContext, ChatDecisionPort, ChatError},
    composite_sink::CompositeEventSink,
    decision::{ConversationTurn, DecisionContext, DecisionError, DecisionPort},
    enrichment::{EnrichmentError, EnrichmentPort, EnrichmentRequest},
    event_sink::{
        ChannelEventSink, ChatRole, EventPayload, EventSink, ExplorationEvent, PageScope,
    },
    session_registry::SessionRegistryPort,
    session_store::{SessionStorePort, StoreError},
};
pub use use_cases::controller::ExplorationController;
pub use use_cases::enrichment::EnrichmentCoordinator;
pub use use_cases::explore::{Collaborators, ExplorationEngine, ExploreError, RunOutcome};
pub use use_cases::input_broker::{InputBroker, InputResponse};
pub use use_cases::shared::{Suspension, SuspensionGate};
