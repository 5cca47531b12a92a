//! Exploration aggregate and its value objects.
//!
//! - [`session::ExplorationSession`]: pages, queue, counters, inputs
//! - [`flow::FlowContext`]: sensitive (authentication) flow tracking
//! - [`history::ActionHistoryEntry`]: executed `act` log
//! - [`checkpoint::ExplorationCheckpoint`]: pause/resume snapshot

pub mod checkpoint;
pub mod flow;
pub mod history;
pub mod session;
