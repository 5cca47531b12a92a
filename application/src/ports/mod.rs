//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod browser;
pub mod chat_decision;
pub mod composite_sink;
pub mod decision;
pub mod enrichment;
pub mod event_sink;
pub mod session_registry;
pub mod session_store;
