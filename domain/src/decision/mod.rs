//! Decisions returned by the decision collaborators.
//!
//! - [`tool_decision::ToolDecision`]: next tool to run on the current page
//! - [`chat::ChatDecision`]: classification of an operator chat message
//! - [`parser`]: boundary validation of raw JSON payloads

pub mod chat;
pub mod parser;
pub mod tool_decision;
